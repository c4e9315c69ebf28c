//! Structural and semantic validation of policy documents.
//!
//! Validation turns the loose [`crate::file`] shapes into the typed
//! [`crate::model`]. It walks the whole document and collects every issue
//! before failing, so one run reports everything wrong with a file.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::file::{
    AllRulesFile, KeyedMap, LabelMapFile, LabelRulesFile, PolicyFile, RuleSetFile,
    SubstitutionValue,
};
use crate::model::{
    AllRules, LabelMap, LabelRole, LabelRules, PolicyDocument, ProjectPolicy, RuleSet, StatusKey,
    StatusMap, TrackerKind,
};
use crate::template::placeholder_of;

/// One problem found in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending entry, e.g. `oss-fuzz.policies.status`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A document failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("policy validation failed: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Whether any issue was reported at exactly `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a parsed document and build the typed model.
pub fn validate_document(file: PolicyFile) -> ValidationResult<PolicyDocument> {
    let mut v = Validator::default();

    if file.is_empty() {
        v.push("<root>", "document declares no projects");
    }

    for name in &file.duplicates {
        v.push("<root>", format!("project {name:?} is declared more than once"));
    }

    let mut projects = BTreeMap::new();
    for (name, entry) in file.entries {
        if name.trim().is_empty() {
            v.push("<root>", "project name must not be empty");
            continue;
        }

        let tracker = match entry.tracker_type.as_deref() {
            None => {
                v.push(format!("{name}.type"), "missing tracker type");
                None
            }
            Some(raw) => {
                let parsed = TrackerKind::parse(raw);
                if parsed.is_none() {
                    v.push(
                        format!("{name}.type"),
                        format!(
                            "unsupported tracker type {raw:?} (expected one of: {})",
                            join_names(TrackerKind::ALL.iter().map(|k| k.as_str()))
                        ),
                    );
                }
                parsed
            }
        };

        let policies = match entry.policies {
            None => {
                v.push(format!("{name}.policies"), "missing policies block");
                None
            }
            Some(rules) => v.rule_set(&format!("{name}.policies"), rules),
        };

        if let (Some(tracker), Some(policies)) = (tracker, policies) {
            projects.insert(
                name.clone(),
                ProjectPolicy {
                    name,
                    tracker,
                    policies,
                },
            );
        }
    }

    if v.issues.is_empty() {
        Ok(PolicyDocument::new(projects))
    } else {
        Err(ValidationError { issues: v.issues })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn rule_set(&mut self, path: &str, rules: RuleSetFile) -> Option<RuleSet> {
        let status = self.status_map(&format!("{path}.status"), rules.status);
        let all = self.all_rules(&format!("{path}.all"), rules.all.unwrap_or_default());
        let existing = self.existing_rules(
            &format!("{path}.existing"),
            rules.existing.unwrap_or_default(),
        );
        let security = rules
            .security
            .map(|block| self.label_rules(&format!("{path}.security"), block));
        let non_security = rules
            .non_security
            .map(|block| self.label_rules(&format!("{path}.non_security"), block));
        let labels = self.label_map(&format!("{path}.labels"), rules.labels.unwrap_or_default());
        let substitutions = rules
            .substitutions
            .map(|map| self.substitutions(&format!("{path}.substitutions"), map));

        Some(RuleSet {
            status: status?,
            all: all?,
            existing,
            security,
            non_security,
            labels,
            substitutions,
            deadline_policy_message: rules.deadline_policy_message,
        })
    }

    fn status_map(
        &mut self,
        path: &str,
        status: Option<KeyedMap<String>>,
    ) -> Option<StatusMap> {
        let Some(raw) = status else {
            self.push(path, "missing status block");
            return None;
        };

        let before = self.issues.len();
        for key in &raw.duplicates {
            self.push(
                format!("{path}.{key}"),
                "status key is declared more than once",
            );
        }
        let mut map = BTreeMap::new();
        for (key, label) in raw.entries {
            match StatusKey::parse(&key) {
                None => self.push(
                    format!("{path}.{key}"),
                    format!(
                        "unknown status key (expected one of: {})",
                        join_names(StatusKey::ALL.iter().map(|k| k.as_str()))
                    ),
                ),
                Some(_) if label.trim().is_empty() => {
                    self.push(format!("{path}.{key}"), "tracker status label is empty")
                }
                Some(parsed) => {
                    map.insert(parsed, label);
                }
            }
        }
        for key in StatusKey::ALL {
            if !map.contains_key(&key) && !self.has_issue(&format!("{path}.{key}")) {
                self.push(format!("{path}.{key}"), "missing canonical status");
            }
        }

        (self.issues.len() == before).then(|| StatusMap::new(map))
    }

    fn all_rules(&mut self, path: &str, all: AllRulesFile) -> Option<AllRules> {
        let status = match all.status.as_deref() {
            None => Some(StatusKey::New),
            Some(raw) => {
                let parsed = StatusKey::parse(raw);
                if parsed.is_none() {
                    self.push(
                        format!("{path}.status"),
                        format!("{raw:?} is not a canonical status key"),
                    );
                }
                parsed
            }
        };
        let rules = self.label_rules(path, all.rules);
        Some(AllRules {
            status: status?,
            rules,
            issue_body_footer: all.issue_body_footer,
        })
    }

    fn label_rules(&mut self, path: &str, block: LabelRulesFile) -> LabelRules {
        let labels = block.labels.unwrap_or_default();
        let crash_labels = block.crash_labels.unwrap_or_default();
        let non_crash_labels = block.non_crash_labels.unwrap_or_default();
        self.templates(&format!("{path}.labels"), &labels);
        self.templates(&format!("{path}.crash_labels"), &crash_labels);
        self.templates(&format!("{path}.non_crash_labels"), &non_crash_labels);
        LabelRules {
            labels,
            crash_labels,
            non_crash_labels,
            ccs: block.ccs.unwrap_or_default(),
        }
    }

    /// Update rules: labels apply to every update, crash labels conditionally.
    /// CCs are only added when filing, so they are rejected here.
    fn existing_rules(&mut self, path: &str, block: LabelRulesFile) -> LabelRules {
        if block.ccs.as_ref().is_some_and(|ccs| !ccs.is_empty()) {
            self.push(
                format!("{path}.ccs"),
                "ccs apply to new issues only; move them to `all` or a category block",
            );
        }
        self.label_rules(path, block)
    }

    fn substitutions(
        &mut self,
        path: &str,
        map: KeyedMap<SubstitutionValue>,
    ) -> BTreeMap<String, String> {
        for key in &map.duplicates {
            self.push(
                format!("{path}.{key}"),
                "substitution is declared more than once",
            );
        }
        map.entries
            .into_iter()
            .map(|(label, SubstitutionValue(value))| (label, value))
            .collect()
    }

    fn label_map(&mut self, path: &str, labels: LabelMapFile) -> LabelMap {
        let mut roles = BTreeMap::new();
        for (key, template) in labels.roles {
            let Some(role) = LabelRole::parse(&key) else {
                self.push(format!("{path}.{key}"), "unknown label role");
                continue;
            };
            if let Some(template) = template {
                self.template(&format!("{path}.{key}"), &template);
                roles.insert(role, template);
            }
        }

        let crash_types = labels.crash_types.unwrap_or_default();
        for (crash_type, template) in &crash_types {
            self.template(&format!("{path}.crash_types.{crash_type}"), template);
        }

        LabelMap { roles, crash_types }
    }

    fn templates(&mut self, path: &str, templates: &[String]) {
        for (idx, template) in templates.iter().enumerate() {
            self.template(&format!("{path}[{idx}]"), template);
        }
    }

    fn template(&mut self, path: &str, template: &str) {
        if template.trim().is_empty() {
            self.push(path, "label template is empty");
        } else if let Err(e) = placeholder_of(template) {
            self.push(path, e.to_string());
        }
    }

    fn has_issue(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ValidationResult<PolicyDocument> {
        validate_document(serde_yaml::from_str(yaml).unwrap())
    }

    const STATUS: &str = r#"
    status:
      assigned: Assigned
      duplicate: Duplicate
      wontfix: WontFix
      fixed: Fixed
      verified: Verified
      new: New
"#;

    fn project(tracker: &str, extra: &str) -> String {
        format!("proj:\n  type: {tracker}\n  policies:{STATUS}{extra}")
    }

    #[test]
    fn minimal_project_validates() {
        let doc = parse(&project("monorail", "")).unwrap();
        let proj = doc.project("proj").unwrap();
        assert_eq!(proj.tracker, TrackerKind::Monorail);
        assert_eq!(proj.policies.status.len(), 6);
        assert_eq!(proj.policies.all.status, StatusKey::New);
        assert!(proj.policies.security.is_none());
    }

    #[test]
    fn unsupported_tracker_rejected() {
        let err = parse(&project("bugzilla", "")).unwrap_err();
        assert!(err.has_issue_at("proj.type"));
        assert!(err.to_string().contains("bugzilla"));
    }

    #[test]
    fn missing_status_block_rejected() {
        let err = parse("proj:\n  type: jira\n  policies:\n    all:\n      labels: [A]\n")
            .unwrap_err();
        assert!(err.has_issue_at("proj.policies.status"));
    }

    #[test]
    fn every_missing_status_key_reported() {
        let yaml = "proj:\n  type: jira\n  policies:\n    status:\n      new: Open\n      assigned: Assigned\n";
        let err = parse(yaml).unwrap_err();
        for key in ["duplicate", "wontfix", "fixed", "verified"] {
            assert!(err.has_issue_at(&format!("proj.policies.status.{key}")), "{key}");
        }
        assert_eq!(err.issues.len(), 4);
    }

    #[test]
    fn unknown_status_key_rejected() {
        let yaml = project("jira", "").replace("new: New", "new: New\n      closed: Closed");
        let err = parse(&yaml).unwrap_err();
        assert!(err.has_issue_at("proj.policies.status.closed"));
    }

    #[test]
    fn all_status_must_be_canonical() {
        let err = parse(&project("jira", "    all:\n      status: open\n")).unwrap_err();
        assert!(err.has_issue_at("proj.policies.all.status"));
    }

    #[test]
    fn bad_templates_reported_with_index() {
        let extra = "    all:\n      labels: ['ok', '%SANITIZER%-%PLATFORM%', 'Foo-%BAR%']\n";
        let err = parse(&project("monorail", extra)).unwrap_err();
        assert!(err.has_issue_at("proj.policies.all.labels[1]"));
        assert!(err.has_issue_at("proj.policies.all.labels[2]"));
        assert!(!err.has_issue_at("proj.policies.all.labels[0]"));
    }

    #[test]
    fn unknown_label_role_rejected_and_null_role_disabled() {
        let extra = "    labels:\n      component: Foo\n      os: ~\n";
        let err = parse(&project("monorail", extra)).unwrap_err();
        assert!(err.has_issue_at("proj.policies.labels.component"));
        assert_eq!(err.issues.len(), 1);

        let doc = parse(&project("monorail", "    labels:\n      os: ~\n")).unwrap();
        assert_eq!(
            doc.project("proj").unwrap().policies.label(LabelRole::Os),
            None
        );
    }

    #[test]
    fn crash_type_templates_checked() {
        let extra = "    labels:\n      crash_types:\n        UAF: 'Crash-%NOPE%'\n";
        let err = parse(&project("monorail", extra)).unwrap_err();
        assert!(err.has_issue_at("proj.policies.labels.crash_types.UAF"));
    }

    #[test]
    fn issues_from_several_projects_collected() {
        let yaml = "a:\n  type: nope\n  policies:\n    status: {}\nb:\n  policies: {}\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.has_issue_at("a.type"));
        assert!(err.has_issue_at("a.policies.status.fixed"));
        assert!(err.has_issue_at("b.type"));
        assert!(err.has_issue_at("b.policies.status"));
    }

    #[test]
    fn project_declared_twice_rejected() {
        let twice = format!("{}{}", project("monorail", ""), project("jira", ""));
        let err = parse(&twice).unwrap_err();
        assert!(err.has_issue_at("<root>"));
        assert!(err.to_string().contains("\"proj\" is declared more than once"));

        let json = r#"{
            "p": {"type": "monorail", "policies": {"status": {"assigned": "a", "duplicate": "d", "wontfix": "w", "fixed": "f", "verified": "v", "new": "n"}}},
            "p": {"type": "jira", "policies": {"status": {"assigned": "a", "duplicate": "d", "wontfix": "w", "fixed": "f", "verified": "v", "new": "n"}}}
        }"#;
        let err = validate_document(serde_json::from_str(json).unwrap()).unwrap_err();
        assert!(err.has_issue_at("<root>"));
    }

    #[test]
    fn status_key_declared_twice_rejected() {
        let yaml = project("monorail", "").replace("fixed: Fixed", "fixed: Fixed\n      fixed: Closed");
        let err = parse(&yaml).unwrap_err();
        assert!(err.has_issue_at("proj.policies.status.fixed"));
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn substitution_ids_may_be_integers() {
        let extra = "    substitutions:\n      ClusterFuzz: 1638179\n      Security: '1638181'\n";
        let doc = parse(&project("google_issue_tracker", extra)).unwrap();
        let rules = &doc.project("proj").unwrap().policies;
        assert_eq!(rules.substitution("ClusterFuzz"), Some("1638179"));
        assert_eq!(rules.substitution("Security"), Some("1638181"));
    }

    #[test]
    fn ccs_on_existing_block_rejected() {
        let extra = "    existing:\n      labels: [Upd]\n      ccs: [someone@example.com]\n";
        let err = parse(&project("monorail", extra)).unwrap_err();
        assert!(err.has_issue_at("proj.policies.existing.ccs"));
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn empty_document_rejected() {
        let err = validate_document(PolicyFile::default()).unwrap_err();
        assert!(err.has_issue_at("<root>"));
    }
}
