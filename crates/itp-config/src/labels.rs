//! Label and issue-property resolution for a project policy.

use serde::Serialize;
use std::collections::HashSet;

use crate::model::{LabelRole, ProjectPolicy};
use crate::template::{render_label, LabelContext, TemplateError};

/// What the caller knows about the issue being filed or updated.
#[derive(Debug, Clone, Default)]
pub struct IssueContext {
    pub is_security: bool,
    pub is_crash: bool,
    pub is_update: bool,
    pub labels: LabelContext,
}

/// Insertion-ordered set of rendered strings.
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, value: String) {
        if self.seen.insert(value.clone()) {
            self.items.push(value);
        }
    }

    fn extend_rendered<'a>(
        &mut self,
        templates: impl IntoIterator<Item = &'a String>,
        context: &LabelContext,
    ) -> Result<(), TemplateError> {
        for template in templates {
            self.insert(render_label(template, context)?);
        }
        Ok(())
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Labels to apply to an issue, in declaration order, first occurrence wins.
///
/// `all` comes first, then the security or non-security block (with its
/// crash or non-crash labels), then `existing` (likewise) when updating.
pub fn resolve_labels(
    policy: &ProjectPolicy,
    issue: &IssueContext,
) -> Result<Vec<String>, TemplateError> {
    let rules = &policy.policies;
    let mut out = OrderedSet::default();

    out.extend_rendered(rules.all.rules.templates_for(issue.is_crash), &issue.labels)?;
    if let Some(category) = rules.category(issue.is_security) {
        out.extend_rendered(category.templates_for(issue.is_crash), &issue.labels)?;
    }
    if issue.is_update {
        out.extend_rendered(rules.existing.templates_for(issue.is_crash), &issue.labels)?;
    }

    Ok(out.into_vec())
}

/// Tracker-specific replacement for a label, or the label itself.
pub fn apply_substitution<'a>(policy: &'a ProjectPolicy, label: &'a str) -> &'a str {
    policy.policies.substitution(label).unwrap_or(label)
}

/// [`resolve_labels`] followed by [`apply_substitution`] on every label.
pub fn resolve_tracker_labels(
    policy: &ProjectPolicy,
    issue: &IssueContext,
) -> Result<Vec<String>, TemplateError> {
    let mut out = OrderedSet::default();
    for label in resolve_labels(policy, issue)? {
        out.insert(apply_substitution(policy, &label).to_string());
    }
    Ok(out.into_vec())
}

/// Everything needed to file a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssueProperties {
    /// Tracker status label.
    pub status: String,
    pub labels: Vec<String>,
    pub ccs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_body_footer: Option<String>,
}

pub fn new_issue_properties(
    policy: &ProjectPolicy,
    is_security: bool,
    is_crash: bool,
    context: &LabelContext,
) -> Result<NewIssueProperties, TemplateError> {
    let rules = &policy.policies;
    let labels = resolve_labels(
        policy,
        &IssueContext {
            is_security,
            is_crash,
            is_update: false,
            labels: context.clone(),
        },
    )?;

    let mut ccs = OrderedSet::default();
    for cc in rules.all.rules.ccs.iter().chain(
        rules
            .category(is_security)
            .map(|c| c.ccs.as_slice())
            .unwrap_or_default(),
    ) {
        ccs.insert(cc.clone());
    }

    Ok(NewIssueProperties {
        status: rules.new_issue_status().to_string(),
        labels,
        ccs: ccs.into_vec(),
        issue_body_footer: rules.issue_body_footer().map(str::to_string),
    })
}

/// Rendered `existing` labels for an issue update.
pub fn existing_issue_labels(
    policy: &ProjectPolicy,
    is_crash: bool,
    context: &LabelContext,
) -> Result<Vec<String>, TemplateError> {
    let mut out = OrderedSet::default();
    out.extend_rendered(policy.policies.existing.templates_for(is_crash), context)?;
    Ok(out.into_vec())
}

/// Rendered label for a role; `Ok(None)` when the policy leaves it unset.
pub fn render_role(
    policy: &ProjectPolicy,
    role: LabelRole,
    context: &LabelContext,
) -> Result<Option<String>, TemplateError> {
    policy
        .policies
        .label(role)
        .map(|template| render_label(template, context))
        .transpose()
}

/// Rendered label for a crash type; `Ok(None)` when unmapped.
pub fn crash_type_label(
    policy: &ProjectPolicy,
    crash_type: &str,
    context: &LabelContext,
) -> Result<Option<String>, TemplateError> {
    policy
        .policies
        .crash_type_label(crash_type)
        .map(|template| render_label(template, context))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use crate::model::PolicyDocument;
    use chrono::NaiveDate;

    const POLICY: &str = r#"
proj:
  type: google_issue_tracker
  policies:
    status: {assigned: ASSIGNED, duplicate: DUPLICATE, wontfix: INFEASIBLE, fixed: FIXED, verified: VERIFIED, new: NEW}
    all:
      status: assigned
      labels: [ClusterFuzz, 'Stability-%SANITIZER%']
      ccs: [triage@example.com]
    security:
      labels: [Type-Bug-Security]
      ccs: [security@example.com, triage@example.com]
    non_security:
      labels: [Type-Bug]
      crash_labels: [Stability-Crash]
      non_crash_labels: [Pri-2]
    existing:
      labels: ['Stability-%SANITIZER%', Updated]
      crash_labels: [Crash-Updated]
    labels:
      reported: 'Reported-%YYYY-MM-DD%'
      os: 'OS-%PLATFORM%'
      crash_types:
        Heap-use-after-free: UAF
    substitutions:
      ClusterFuzz: '1234567'
      Type-Bug: '7654321'
"#;

    fn doc() -> PolicyDocument {
        load_str(POLICY).unwrap()
    }

    fn ctx() -> LabelContext {
        LabelContext::new().with_sanitizer("ASan")
    }

    #[test]
    fn non_crash_labels_used_when_not_a_crash() {
        let doc = doc();
        let issue = IssueContext {
            labels: ctx(),
            ..Default::default()
        };
        let labels = resolve_labels(doc.project("proj").unwrap(), &issue).unwrap();
        assert_eq!(labels, ["ClusterFuzz", "Stability-ASan", "Type-Bug", "Pri-2"]);
    }

    #[test]
    fn existing_labels_appended_on_update_without_duplicates() {
        let doc = doc();
        let issue = IssueContext {
            is_crash: true,
            is_update: true,
            labels: ctx(),
            ..Default::default()
        };
        let labels = resolve_labels(doc.project("proj").unwrap(), &issue).unwrap();
        assert_eq!(
            labels,
            [
                "ClusterFuzz",
                "Stability-ASan",
                "Type-Bug",
                "Stability-Crash",
                "Updated",
                "Crash-Updated"
            ]
        );
    }

    #[test]
    fn existing_crash_labels_skipped_for_non_crash_update() {
        let doc = doc();
        let issue = IssueContext {
            is_update: true,
            labels: ctx(),
            ..Default::default()
        };
        let labels = resolve_labels(doc.project("proj").unwrap(), &issue).unwrap();
        assert_eq!(
            labels,
            ["ClusterFuzz", "Stability-ASan", "Type-Bug", "Pri-2", "Updated"]
        );
    }

    #[test]
    fn missing_sanitizer_surfaces_template_error() {
        let doc = doc();
        let err = resolve_labels(doc.project("proj").unwrap(), &IssueContext::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingValue { .. }));
    }

    #[test]
    fn substitution_exact_match_only() {
        let doc = doc();
        let proj = doc.project("proj").unwrap();
        assert_eq!(apply_substitution(proj, "ClusterFuzz"), "1234567");
        assert_eq!(apply_substitution(proj, "clusterfuzz"), "clusterfuzz");
    }

    #[test]
    fn tracker_labels_are_substituted() {
        let doc = doc();
        let issue = IssueContext {
            labels: ctx(),
            ..Default::default()
        };
        let labels = resolve_tracker_labels(doc.project("proj").unwrap(), &issue).unwrap();
        assert_eq!(labels, ["1234567", "Stability-ASan", "7654321", "Pri-2"]);
    }

    #[test]
    fn new_issue_properties_for_security_bug() {
        let doc = doc();
        let props = new_issue_properties(doc.project("proj").unwrap(), true, true, &ctx()).unwrap();
        assert_eq!(props.status, "ASSIGNED");
        assert_eq!(
            props.labels,
            ["ClusterFuzz", "Stability-ASan", "Type-Bug-Security"]
        );
        assert_eq!(props.ccs, ["triage@example.com", "security@example.com"]);
        assert_eq!(props.issue_body_footer, None);
    }

    #[test]
    fn existing_issue_labels_rendered() {
        let doc = doc();
        let proj = doc.project("proj").unwrap();
        let labels = existing_issue_labels(proj, false, &ctx()).unwrap();
        assert_eq!(labels, ["Stability-ASan", "Updated"]);
        let labels = existing_issue_labels(proj, true, &ctx()).unwrap();
        assert_eq!(labels, ["Stability-ASan", "Updated", "Crash-Updated"]);
    }

    #[test]
    fn role_and_crash_type_labels() {
        let doc = doc();
        let proj = doc.project("proj").unwrap();
        let ctx = LabelContext::new()
            .with_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
            .with_platform("Android");

        assert_eq!(
            render_role(proj, LabelRole::Reported, &ctx).unwrap().as_deref(),
            Some("Reported-2024-03-09")
        );
        assert_eq!(
            render_role(proj, LabelRole::Os, &ctx).unwrap().as_deref(),
            Some("OS-Android")
        );
        assert_eq!(render_role(proj, LabelRole::FuzzBlocker, &ctx).unwrap(), None);
        assert_eq!(
            crash_type_label(proj, "Heap-use-after-free", &ctx)
                .unwrap()
                .as_deref(),
            Some("UAF")
        );
        assert_eq!(crash_type_label(proj, "Null-dereference", &ctx).unwrap(), None);
    }
}
