//! Reading policy documents from bytes, readers, and files.

use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{PolicyError, PolicyFormat};
use crate::file::PolicyFile;
use crate::model::PolicyDocument;
use crate::validate::{validate_document, ValidationError, ValidationIssue};

/// Load a YAML (or JSON-as-YAML) policy document from a byte source.
pub fn load<R: Read>(mut source: R) -> Result<PolicyDocument, PolicyError> {
    let mut bytes = Vec::new();
    source
        .read_to_end(&mut bytes)
        .map_err(|source| PolicyError::Io {
            origin: "reader".to_string(),
            source,
        })?;
    parse_document(&bytes, PolicyFormat::Yaml)
}

/// Load a YAML policy document from a string.
pub fn load_str(yaml: &str) -> Result<PolicyDocument, PolicyError> {
    parse_document(yaml.as_bytes(), PolicyFormat::Yaml)
}

/// Load a JSON policy document from a string.
pub fn load_json(json: &str) -> Result<PolicyDocument, PolicyError> {
    parse_document(json.as_bytes(), PolicyFormat::Json)
}

/// Load a policy file; the format follows the file extension.
pub fn load_file(path: &Path) -> Result<PolicyDocument, PolicyError> {
    let bytes = read_file(path)?;
    parse_document(&bytes, PolicyFormat::from_path(path))
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, PolicyError> {
    std::fs::read(path).map_err(|source| PolicyError::Io {
        origin: path.display().to_string(),
        source,
    })
}

/// Parse and validate raw document bytes.
pub fn parse_document(bytes: &[u8], format: PolicyFormat) -> Result<PolicyDocument, PolicyError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError {
            issues: vec![ValidationIssue {
                path: "<root>".to_string(),
                message: "document is empty".to_string(),
            }],
        }
        .into());
    }

    let file: PolicyFile = match format {
        PolicyFormat::Yaml => serde_yaml::from_slice(bytes).map_err(|e| PolicyError::Parse {
            format,
            message: e.to_string(),
        })?,
        PolicyFormat::Json => serde_json::from_slice(bytes).map_err(|e| PolicyError::Parse {
            format,
            message: e.to_string(),
        })?,
    };

    let document = validate_document(file)?;
    debug!(
        projects = document.len(),
        format = %format,
        "loaded issue tracker policy"
    );
    Ok(document)
}
