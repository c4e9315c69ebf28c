//! Policy snapshots: what was loaded, from where, and when.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::model::PolicyDocument;

/// Provenance of a loaded policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySnapshot {
    /// File the policy was read from, if any.
    pub source: Option<PathBuf>,

    /// SHA-256 of the raw document bytes.
    pub sha256: String,

    /// RFC 3339 load timestamp (UTC).
    pub loaded_at: String,

    pub projects: Vec<String>,
}

impl PolicySnapshot {
    pub fn capture(source: Option<&Path>, raw: &[u8], document: &PolicyDocument) -> Self {
        Self {
            source: source.map(Path::to_path_buf),
            sha256: sha256_hex(raw),
            loaded_at: chrono::Utc::now().to_rfc3339(),
            projects: document.project_names().map(str::to_string).collect(),
        }
    }

    /// Whether `raw` is byte-identical to the snapshotted document.
    pub fn matches(&self, raw: &[u8]) -> bool {
        self.sha256 == sha256_hex(raw)
    }
}

/// Compute SHA-256 hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    const YAML: &str = "p:\n  type: jira\n  policies:\n    status: {assigned: a, duplicate: d, wontfix: w, fixed: f, verified: v, new: n}\n";

    #[test]
    fn sha256_hex_deterministic() {
        let h1 = sha256_hex(b"test data");
        let h2 = sha256_hex(b"test data");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn capture_records_projects_and_hash() {
        let doc = load_str(YAML).unwrap();
        let snap = PolicySnapshot::capture(Some(Path::new("/etc/p.yaml")), YAML.as_bytes(), &doc);
        assert_eq!(snap.projects, ["p"]);
        assert_eq!(snap.source.as_deref(), Some(Path::new("/etc/p.yaml")));
        assert!(snap.matches(YAML.as_bytes()));
        assert!(!snap.matches(b"other"));
        assert!(chrono::DateTime::parse_from_rfc3339(&snap.loaded_at).is_ok());
    }
}
