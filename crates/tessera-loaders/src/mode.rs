//! Render modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a loader is asked to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Self-contained markup ready for first paint.
    Full,
    /// Wrapper carrying hydration metadata but no content.
    Shell,
    /// Inner fragment only, injected into an existing shell.
    Content,
}

impl RenderMode {
    /// Lowercase name as used in markup and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Shell => "shell",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "shell" => Ok(Self::Shell),
            "content" => Ok(Self::Content),
            other => Err(format!("unknown render mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("shell".parse::<RenderMode>().unwrap(), RenderMode::Shell);
        assert!("partial".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RenderMode::Content).unwrap(),
            "\"content\""
        );
    }
}
