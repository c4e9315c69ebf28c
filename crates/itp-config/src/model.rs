//! Validated, immutable policy model.
//!
//! Values of these types are only produced by [`crate::validate`], so the
//! invariants documented on each type hold for every instance a caller sees.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::PolicyError;

// ── Enumerations ────────────────────────────────────────────────────────

/// Issue tracker backend a project files into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    Monorail,
    GoogleIssueTracker,
    Jira,
    Github,
}

impl TrackerKind {
    pub const ALL: [TrackerKind; 4] = [
        TrackerKind::Monorail,
        TrackerKind::GoogleIssueTracker,
        TrackerKind::Jira,
        TrackerKind::Github,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrackerKind::Monorail => "monorail",
            TrackerKind::GoogleIssueTracker => "google_issue_tracker",
            TrackerKind::Jira => "jira",
            TrackerKind::Github => "github",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical issue lifecycle state. Every tracker maps all six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKey {
    Assigned,
    Duplicate,
    Wontfix,
    Fixed,
    Verified,
    New,
}

impl StatusKey {
    pub const ALL: [StatusKey; 6] = [
        StatusKey::Assigned,
        StatusKey::Duplicate,
        StatusKey::Wontfix,
        StatusKey::Fixed,
        StatusKey::Verified,
        StatusKey::New,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusKey::Assigned => "assigned",
            StatusKey::Duplicate => "duplicate",
            StatusKey::Wontfix => "wontfix",
            StatusKey::Fixed => "fixed",
            StatusKey::Verified => "verified",
            StatusKey::New => "new",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role a label plays for the filing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRole {
    Verified,
    Ignore,
    Wrong,
    NeedsFeedback,
    InvalidFuzzer,
    FuzzBlocker,
    Reproducible,
    Unreproducible,
    RestrictView,
    Reported,
    SecuritySeverity,
    Os,
    AutoCcFromOwners,
}

impl LabelRole {
    pub const ALL: [LabelRole; 13] = [
        LabelRole::Verified,
        LabelRole::Ignore,
        LabelRole::Wrong,
        LabelRole::NeedsFeedback,
        LabelRole::InvalidFuzzer,
        LabelRole::FuzzBlocker,
        LabelRole::Reproducible,
        LabelRole::Unreproducible,
        LabelRole::RestrictView,
        LabelRole::Reported,
        LabelRole::SecuritySeverity,
        LabelRole::Os,
        LabelRole::AutoCcFromOwners,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelRole::Verified => "verified",
            LabelRole::Ignore => "ignore",
            LabelRole::Wrong => "wrong",
            LabelRole::NeedsFeedback => "needs_feedback",
            LabelRole::InvalidFuzzer => "invalid_fuzzer",
            LabelRole::FuzzBlocker => "fuzz_blocker",
            LabelRole::Reproducible => "reproducible",
            LabelRole::Unreproducible => "unreproducible",
            LabelRole::RestrictView => "restrict_view",
            LabelRole::Reported => "reported",
            LabelRole::SecuritySeverity => "security_severity",
            LabelRole::Os => "os",
            LabelRole::AutoCcFromOwners => "auto_cc_from_owners",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

impl fmt::Display for LabelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Rule blocks ─────────────────────────────────────────────────────────

/// Canonical status → tracker status label. Always holds all six keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<StatusKey, String>);

impl StatusMap {
    pub(crate) fn new(map: BTreeMap<StatusKey, String>) -> Self {
        debug_assert_eq!(map.len(), StatusKey::ALL.len());
        Self(map)
    }

    /// Tracker label for a canonical key.
    pub fn get(&self, key: StatusKey) -> &str {
        self.0.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Canonical key whose tracker label is exactly `label`.
    pub fn key_for(&self, label: &str) -> Option<StatusKey> {
        self.0
            .iter()
            .find(|(_, tracker_label)| tracker_label.as_str() == label)
            .map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKey, &str)> {
        self.0.iter().map(|(key, label)| (*key, label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered label templates and CCs for one rule block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelRules {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Applied in addition to `labels` when the defect is a crash.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crash_labels: Vec<String>,

    /// Applied in addition to `labels` when the defect is not a crash.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub non_crash_labels: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ccs: Vec<String>,
}

impl LabelRules {
    /// Templates this block contributes for a crash / non-crash defect.
    pub fn templates_for(&self, is_crash: bool) -> impl Iterator<Item = &String> {
        let conditional = if is_crash {
            &self.crash_labels
        } else {
            &self.non_crash_labels
        };
        self.labels.iter().chain(conditional.iter())
    }
}

/// Rules applied to every newly filed issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllRules {
    pub status: StatusKey,

    #[serde(flatten)]
    pub rules: LabelRules,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_body_footer: Option<String>,
}

impl Default for AllRules {
    fn default() -> Self {
        Self {
            status: StatusKey::New,
            rules: LabelRules::default(),
            issue_body_footer: None,
        }
    }
}

/// Label templates keyed by semantic role, plus per-crash-type labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelMap {
    #[serde(flatten)]
    pub roles: BTreeMap<LabelRole, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub crash_types: BTreeMap<String, String>,
}

/// Complete rule set for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    pub status: StatusMap,
    pub all: AllRules,
    pub existing: LabelRules,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<LabelRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_security: Option<LabelRules>,

    pub labels: LabelMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_policy_message: Option<String>,
}

impl RuleSet {
    /// Tracker status label for a canonical status.
    pub fn status_label(&self, key: StatusKey) -> &str {
        self.status.get(key)
    }

    /// Canonical status of a tracker status label, if the tracker label is mapped.
    pub fn canonical_status(&self, tracker_label: &str) -> Option<StatusKey> {
        self.status.key_for(tracker_label)
    }

    /// Tracker status label given to new issues.
    pub fn new_issue_status(&self) -> &str {
        self.status.get(self.all.status)
    }

    /// Raw label template for a role; `None` disables the feature.
    pub fn label(&self, role: LabelRole) -> Option<&str> {
        self.labels.roles.get(&role).map(String::as_str)
    }

    /// Raw label template for a crash type.
    pub fn crash_type_label(&self, crash_type: &str) -> Option<&str> {
        self.labels.crash_types.get(crash_type).map(String::as_str)
    }

    /// Category block for security or non-security defects.
    pub fn category(&self, is_security: bool) -> Option<&LabelRules> {
        if is_security {
            self.security.as_ref()
        } else {
            self.non_security.as_ref()
        }
    }

    pub fn substitution(&self, label: &str) -> Option<&str> {
        self.substitutions
            .as_ref()
            .and_then(|map| map.get(label))
            .map(String::as_str)
    }

    pub fn issue_body_footer(&self) -> Option<&str> {
        self.all.issue_body_footer.as_deref()
    }

    pub fn deadline_policy_message(&self) -> Option<&str> {
        self.deadline_policy_message.as_deref()
    }
}

// ── Projects ────────────────────────────────────────────────────────────

/// Policy for a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPolicy {
    pub name: String,

    #[serde(rename = "type")]
    pub tracker: TrackerKind,

    pub policies: RuleSet,
}

/// Every project's policy, keyed by project name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PolicyDocument {
    projects: BTreeMap<String, ProjectPolicy>,
}

impl PolicyDocument {
    pub(crate) fn new(projects: BTreeMap<String, ProjectPolicy>) -> Self {
        Self { projects }
    }

    /// Look up a project's policy.
    pub fn project(&self, name: &str) -> Result<&ProjectPolicy, PolicyError> {
        self.projects.get(name).ok_or_else(|| PolicyError::NotFound {
            project: name.to_string(),
        })
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectPolicy> {
        self.projects.values()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
