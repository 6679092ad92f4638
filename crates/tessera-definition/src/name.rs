//! Validated identifiers: definition file names and `type/version` specs.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DefinitionError;

static DEFINITION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\.json$").unwrap());

static SPEC_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Name of a page definition file, e.g. `index.json`.
///
/// Construction is the only path-traversal defence: a name that parses can be
/// joined onto the definitions directory without escaping it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionName(String);

impl DefinitionName {
    /// Validate a definition file name.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidName`] unless `name` matches
    /// `[A-Za-z0-9_-]+.json`.
    pub fn parse(name: &str) -> Result<Self, DefinitionError> {
        if DEFINITION_NAME.is_match(name) {
            Ok(Self(name.to_owned()))
        } else {
            Err(DefinitionError::InvalidName(name.to_owned()))
        }
    }

    /// The file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DefinitionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A `type/version` pair such as `placeholder/type_1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentSpec {
    kind: String,
    version: String,
}

impl ComponentSpec {
    /// Build a spec from its two halves.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidSpec`] if either half contains
    /// characters outside `[A-Za-z0-9_-]` or is empty.
    pub fn new(kind: &str, version: &str) -> Result<Self, DefinitionError> {
        if SPEC_PART.is_match(kind) && SPEC_PART.is_match(version) {
            Ok(Self {
                kind: kind.to_owned(),
                version: version.to_owned(),
            })
        } else {
            Err(DefinitionError::InvalidSpec(format!("{kind}/{version}")))
        }
    }

    /// Component or container kind (`placeholder`, `vertical`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Version tag (`type_1`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for ComponentSpec {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, version) = s
            .split_once('/')
            .ok_or_else(|| DefinitionError::InvalidSpec(s.to_owned()))?;
        Self::new(kind, version).map_err(|_| DefinitionError::InvalidSpec(s.to_owned()))
    }
}

impl fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.version)
    }
}

impl Serialize for ComponentSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComponentSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
