//! Output format selection for command-line reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// YAML, matching the policy file format
    Yaml,
}

impl OutputFormat {
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        assert!(!OutputFormat::Text.is_machine_readable());
        assert!(OutputFormat::Json.is_machine_readable());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Yaml).unwrap();
        assert_eq!(json, "\"yaml\"");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
