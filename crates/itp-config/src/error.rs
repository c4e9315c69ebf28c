//! Errors returned by the policy loader.

use std::fmt;
use std::path::PathBuf;

use crate::template::TemplateError;
use crate::validate::ValidationError;

/// Serialization format of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Yaml,
    Json,
}

impl PolicyFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => PolicyFormat::Json,
            _ => PolicyFormat::Yaml,
        }
    }
}

impl fmt::Display for PolicyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyFormat::Yaml => write!(f, "YAML"),
            PolicyFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Errors that can occur while loading or querying a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("{format} parse error: {message}")]
    Parse {
        format: PolicyFormat,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("project not found: {project}")]
    NotFound { project: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to read policy from {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no policy file found (searched: {})", display_paths(.searched))]
    NoPolicyFile { searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<PolicyError> for itp_common::Error {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Parse { .. } => itp_common::Error::PolicyParse(err.to_string()),
            PolicyError::Validation(e) => itp_common::Error::PolicyValidation(e.to_string()),
            PolicyError::NotFound { project } => itp_common::Error::ProjectNotFound { project },
            PolicyError::Template(e) => itp_common::Error::Template(e.to_string()),
            PolicyError::Io { source, .. } => itp_common::Error::Io(source),
            PolicyError::NoPolicyFile { ref searched } => itp_common::Error::PolicyFileMissing {
                searched: display_paths(searched),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            PolicyFormat::from_path(Path::new("p.json")),
            PolicyFormat::Json
        );
        assert_eq!(
            PolicyFormat::from_path(Path::new("p.JSON")),
            PolicyFormat::Json
        );
        assert_eq!(
            PolicyFormat::from_path(Path::new("p.yaml")),
            PolicyFormat::Yaml
        );
        assert_eq!(PolicyFormat::from_path(Path::new("policy")), PolicyFormat::Yaml);
    }

    #[test]
    fn converts_into_common_error_codes() {
        let not_found: itp_common::Error = PolicyError::NotFound {
            project: "x".into(),
        }
        .into();
        assert_eq!(not_found.code(), 20);

        let parse: itp_common::Error = PolicyError::Parse {
            format: PolicyFormat::Yaml,
            message: "bad indent".into(),
        }
        .into();
        assert_eq!(parse.code(), 11);
        assert!(parse.to_string().contains("bad indent"));

        let missing: itp_common::Error = PolicyError::NoPolicyFile {
            searched: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        }
        .into();
        assert!(missing.to_string().contains("/a, /b"));
    }
}
