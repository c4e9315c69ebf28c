//! Process-wide policy handle with atomic replacement.
//!
//! Readers take an `Arc` to the current [`LoadedPolicy`] and keep using it
//! for as long as they like; a reload swaps the pointer and never mutates a
//! document in place.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::{PolicyError, PolicyFormat};
use crate::loader::{parse_document, read_file};
use crate::model::PolicyDocument;
use crate::snapshot::PolicySnapshot;

/// A validated document together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedPolicy {
    pub document: PolicyDocument,
    pub snapshot: PolicySnapshot,
}

impl LoadedPolicy {
    pub fn from_bytes(
        raw: &[u8],
        format: PolicyFormat,
        source: Option<&Path>,
    ) -> Result<Self, PolicyError> {
        let document = parse_document(raw, format)?;
        let snapshot = PolicySnapshot::capture(source, raw, &document);
        Ok(Self { document, snapshot })
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let raw = read_file(path)?;
        Self::from_bytes(&raw, PolicyFormat::from_path(path), Some(path))
    }
}

/// Shared, swappable policy.
#[derive(Debug)]
pub struct SharedPolicy {
    current: RwLock<Arc<LoadedPolicy>>,
}

impl SharedPolicy {
    pub fn new(initial: LoadedPolicy) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        LoadedPolicy::from_file(path).map(Self::new)
    }

    /// The policy in effect right now.
    pub fn current(&self) -> Arc<LoadedPolicy> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install `next`, returning the policy it replaced.
    pub fn replace(&self, next: LoadedPolicy) -> Arc<LoadedPolicy> {
        let next = Arc::new(next);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Re-read `path` and swap it in if its content changed.
    ///
    /// Returns `Ok(true)` when a new policy was installed. On error the
    /// current policy stays in effect.
    pub fn reload_if_changed(&self, path: &Path) -> Result<bool, PolicyError> {
        let raw = read_file(path)?;
        if self.current().snapshot.matches(&raw) {
            debug!(path = %path.display(), "policy unchanged; keeping current");
            return Ok(false);
        }

        let next = LoadedPolicy::from_bytes(&raw, PolicyFormat::from_path(path), Some(path))?;
        info!(
            path = %path.display(),
            sha256 = %next.snapshot.sha256,
            projects = next.document.len(),
            "installed reloaded issue tracker policy"
        );
        self.replace(next);
        Ok(true)
    }
}
