//! Issue tracker policy loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for issue tracker policy documents (YAML or JSON)
//! - Structural and semantic validation with path-qualified issues
//! - Label template rendering and per-issue label resolution
//! - Policy file discovery (CLI → env → XDG → system)
//! - Snapshots and an atomically swappable shared policy for hot reload

pub mod error;
pub mod file;
pub mod labels;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod shared;
pub mod snapshot;
pub mod template;
pub mod validate;

pub use error::{PolicyError, PolicyFormat};
pub use file::policy_schema;
pub use labels::{
    apply_substitution, crash_type_label, existing_issue_labels, new_issue_properties,
    render_role, resolve_labels, resolve_tracker_labels, IssueContext, NewIssueProperties,
};
pub use loader::{load, load_file, load_json, load_str, parse_document};
pub use model::{
    AllRules, LabelMap, LabelRole, LabelRules, PolicyDocument, ProjectPolicy, RuleSet, StatusKey,
    StatusMap, TrackerKind,
};
pub use resolve::{resolve_policy_path, ConfigPaths, PolicySource, ResolvedPolicyPath};
pub use shared::{LoadedPolicy, SharedPolicy};
pub use snapshot::PolicySnapshot;
pub use template::{render_label, LabelContext, Placeholder, TemplateError};
pub use validate::{ValidationError, ValidationIssue, ValidationResult};
