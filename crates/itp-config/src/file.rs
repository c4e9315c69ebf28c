//! On-disk policy document shapes.
//!
//! These mirror the YAML/JSON layout one-to-one and are deliberately loose:
//! required fields are `Option` and enumerations are plain strings, so that
//! missing or unsupported values surface as validation issues with a path
//! rather than as opaque parse failures.

use schemars::JsonSchema;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Top-level document: project name → project policy.
pub type PolicyFile = KeyedMap<ProjectPolicyFile>;

/// String-keyed mapping that remembers keys declared more than once.
///
/// The first declaration of a key is kept; later ones are recorded in
/// `duplicates` so validation can reject the document.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<V> {
    pub entries: BTreeMap<String, V>,
    pub duplicates: Vec<String>,
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }
}

impl<V> KeyedMap<V> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: V) {
        if self.entries.contains_key(&key) {
            if !self.duplicates.contains(&key) {
                self.duplicates.push(key);
            }
        } else {
            self.entries.insert(key, value);
        }
    }
}

impl<V: Serialize> Serialize for KeyedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for KeyedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for KeyedMapVisitor<V> {
            type Value = KeyedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = KeyedMap::default();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(KeyedMapVisitor(PhantomData))
    }
}

/// Substitution target: an opaque tracker ID written as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubstitutionValue(pub String);

impl<'de> Deserialize<'de> for SubstitutionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = SubstitutionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer substitution value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(SubstitutionValue(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(SubstitutionValue(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(SubstitutionValue(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(SubstitutionValue(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// One project's entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectPolicyFile {
    /// Tracker backend: monorail, google_issue_tracker, jira or github.
    #[serde(rename = "type", default)]
    pub tracker_type: Option<String>,

    #[serde(default)]
    pub policies: Option<RuleSetFile>,
}

/// Rules for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RuleSetFile {
    /// Canonical status key → tracker status label. All six keys required.
    #[serde(default)]
    #[schemars(with = "Option<BTreeMap<String, String>>")]
    pub status: Option<KeyedMap<String>>,

    #[serde(default)]
    pub all: Option<AllRulesFile>,

    /// Rules applied when updating an already-filed issue.
    #[serde(default)]
    pub existing: Option<LabelRulesFile>,

    #[serde(default)]
    pub security: Option<LabelRulesFile>,

    #[serde(default)]
    pub non_security: Option<LabelRulesFile>,

    #[serde(default)]
    pub labels: Option<LabelMapFile>,

    /// Literal label → tracker-specific replacement (string or integer ID).
    #[serde(default)]
    #[schemars(with = "Option<BTreeMap<String, String>>")]
    pub substitutions: Option<KeyedMap<SubstitutionValue>>,

    #[serde(default)]
    pub deadline_policy_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LabelRulesFile {
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    #[serde(default)]
    pub crash_labels: Option<Vec<String>>,

    #[serde(default)]
    pub non_crash_labels: Option<Vec<String>>,

    #[serde(default)]
    pub ccs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AllRulesFile {
    /// Canonical status key given to new issues (defaults to `new`).
    #[serde(default)]
    pub status: Option<String>,

    #[serde(flatten)]
    pub rules: LabelRulesFile,

    #[serde(default)]
    pub issue_body_footer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LabelMapFile {
    /// Crash type → label template.
    #[serde(default)]
    pub crash_types: Option<BTreeMap<String, String>>,

    /// Label role → label template; a null value disables the role.
    #[serde(flatten)]
    pub roles: BTreeMap<String, Option<String>>,
}

/// JSON schema describing the on-disk policy document.
pub fn policy_schema() -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(schemars::schema_for!(BTreeMap<String, ProjectPolicyFile>))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_entries_land_in_flattened_map() {
        let yaml = r#"
crash_types:
  Heap-buffer-overflow: Crash-Heap
os: OS-%PLATFORM%
fuzz_blocker: ~
"#;
        let labels: LabelMapFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            labels.crash_types.unwrap()["Heap-buffer-overflow"],
            "Crash-Heap"
        );
        assert_eq!(labels.roles["os"].as_deref(), Some("OS-%PLATFORM%"));
        assert_eq!(labels.roles["fuzz_blocker"], None);
        assert!(!labels.roles.contains_key("crash_types"));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let project: ProjectPolicyFile = serde_yaml::from_str("type: jira\n").unwrap();
        assert_eq!(project.tracker_type.as_deref(), Some("jira"));
        assert!(project.policies.is_none());
    }

    #[test]
    fn all_block_keeps_status_and_labels() {
        let yaml = "status: assigned\nlabels: [A, B]\nissue_body_footer: bye\n";
        let all: AllRulesFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(all.status.as_deref(), Some("assigned"));
        assert_eq!(all.rules.labels.unwrap(), ["A", "B"]);
        assert_eq!(all.issue_body_footer.as_deref(), Some("bye"));
    }

    #[test]
    fn repeated_keys_are_recorded_not_overwritten() {
        let yaml = "a: {type: monorail}\nb: {type: jira}\na: {type: github}\n";
        let file: PolicyFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.duplicates, ["a"]);
        assert_eq!(file.entries["a"].tracker_type.as_deref(), Some("monorail"));

        let json = r#"{"a": {"type": "monorail"}, "a": {"type": "jira"}}"#;
        let file: PolicyFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.duplicates, ["a"]);
    }

    #[test]
    fn substitution_values_accept_integers_in_both_formats() {
        let from_yaml: KeyedMap<SubstitutionValue> =
            serde_yaml::from_str("ClusterFuzz: 1638179\nSecurity: '1638181'\n").unwrap();
        let from_json: KeyedMap<SubstitutionValue> =
            serde_json::from_str(r#"{"ClusterFuzz": 1638179, "Security": "1638181"}"#).unwrap();
        for map in [from_yaml, from_json] {
            assert_eq!(map.entries["ClusterFuzz"].0, "1638179");
            assert_eq!(map.entries["Security"].0, "1638181");
        }
    }

    #[test]
    fn substitution_values_reject_non_scalars() {
        assert!(serde_json::from_str::<SubstitutionValue>("[1]").is_err());
        assert!(serde_json::from_str::<SubstitutionValue>("1.5").is_err());
    }

    #[test]
    fn schema_describes_project_entries() {
        let schema = policy_schema().unwrap();
        let text = schema.to_string();
        assert!(text.contains("ProjectPolicyFile"));
        assert!(text.contains("deadline_policy_message"));
    }
}
