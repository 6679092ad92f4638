//! URL fragment grammar for navigation.
//!
//! ```text
//! #target1/state1/k=v&k2=v2|target2/state2.tab
//! ```
//!
//! Instructions are separated by `|`; each is `id/state` with an optional
//! third `/`-segment of `&`-joined, percent-encoded `key=value` pairs. Text
//! after the last `.` names the active tab.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left unescaped in parameter keys and values.
///
/// `.` is escaped so an encoded value can never be mistaken for the tab
/// separator.
const PARAM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// A single `(target, state, parameters)` navigation instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavInstruction {
    /// Element id.
    pub target: String,
    /// Requested state (`visible`, `hidden`, `scrollTo`, ...).
    pub state: String,
    /// Handler parameters.
    pub parameters: BTreeMap<String, String>,
}

impl NavInstruction {
    /// Instruction without parameters.
    pub fn new(target: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: state.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Parsed navigation fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Instructions in fragment order. A target appears at most once; a
    /// repeated target replaces the earlier instruction in place.
    pub instructions: Vec<NavInstruction>,
    /// Tab token after the last `.`.
    pub tab: Option<String>,
}

impl Fragment {
    /// Parse a fragment, with or without the leading `#`.
    ///
    /// Never fails: segments without both an id and a state are dropped, so
    /// a malformed fragment yields no instructions.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);

        let (body, tab) = match raw.rsplit_once('.') {
            Some((body, tab)) => (body, Some(tab).filter(|t| !t.is_empty())),
            None => (raw, None),
        };

        let mut instructions: Vec<NavInstruction> = Vec::new();
        for segment in body.split('|') {
            let mut parts = segment.split('/');
            let (Some(target), Some(state)) = (parts.next(), parts.next()) else {
                continue;
            };
            if target.is_empty() || state.is_empty() {
                continue;
            }
            let instruction = NavInstruction {
                target: target.to_owned(),
                state: state.to_owned(),
                parameters: parts.next().map(parse_parameters).unwrap_or_default(),
            };
            match instructions.iter_mut().find(|i| i.target == instruction.target) {
                Some(existing) => *existing = instruction,
                None => instructions.push(instruction),
            }
        }

        Self {
            instructions,
            tab: tab.map(str::to_owned),
        }
    }

    /// Whether the fragment carries neither instructions nor a tab.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty() && self.tab.is_none()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_fragment(&self.instructions, self.tab.as_deref()))
    }
}

fn parse_parameters(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((decode(key), decode(value)))
        })
        .collect()
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Build a fragment (without `#`) from instructions and an optional tab.
///
/// Inverse of [`Fragment::parse`] for well-formed input.
#[must_use]
pub fn build_fragment(instructions: &[NavInstruction], tab: Option<&str>) -> String {
    let mut out = instructions
        .iter()
        .map(|i| {
            let mut segment = format!("{}/{}", i.target, i.state);
            if !i.parameters.is_empty() {
                let pairs: Vec<String> = i
                    .parameters
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            utf8_percent_encode(k, PARAM),
                            utf8_percent_encode(v, PARAM)
                        )
                    })
                    .collect();
                segment.push('/');
                segment.push_str(&pairs.join("&"));
            }
            segment
        })
        .collect::<Vec<_>>()
        .join("|");
    if let Some(tab) = tab.filter(|t| !t.is_empty()) {
        out.push('.');
        out.push_str(tab);
    }
    out
}
