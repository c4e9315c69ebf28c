//! Policy file discovery.
//!
//! Resolution order: CLI → env (`ITP_POLICY_FILE`) → XDG config dir → system dir.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::PolicyError;

/// Environment variable naming the policy file.
pub const POLICY_ENV_VAR: &str = "ITP_POLICY_FILE";

/// Directory name under the user and system config roots.
pub const CONFIG_DIR_NAME: &str = "issue-tracker-policy";

/// Policy file name inside the config directory.
pub const POLICY_FILE_NAME: &str = "policy.yaml";

/// Where a resolved policy path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    Cli,
    Env,
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPolicyPath {
    pub path: PathBuf,
    pub source: PolicySource,
}

/// Inputs to policy file resolution.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub explicit: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub user_config_dir: Option<PathBuf>,
    pub system_config_dir: PathBuf,
}

impl ConfigPaths {
    /// Standard locations, with an optional CLI override.
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env: std::env::var_os(POLICY_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            user_config_dir: dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME)),
            system_config_dir: Path::new("/etc").join(CONFIG_DIR_NAME),
        }
    }

    fn defaults(&self) -> Vec<(PathBuf, PolicySource)> {
        let mut out = Vec::new();
        if let Some(dir) = &self.user_config_dir {
            out.push((dir.join(POLICY_FILE_NAME), PolicySource::User));
        }
        out.push((
            self.system_config_dir.join(POLICY_FILE_NAME),
            PolicySource::System,
        ));
        out
    }
}

/// Pick the policy file to load.
///
/// An explicit or env-provided path is returned even if it does not exist,
/// so that the subsequent read error names it. Default locations are only
/// used when present.
pub fn resolve_policy_path(paths: &ConfigPaths) -> Result<ResolvedPolicyPath, PolicyError> {
    if let Some(path) = &paths.explicit {
        return Ok(ResolvedPolicyPath {
            path: path.clone(),
            source: PolicySource::Cli,
        });
    }
    if let Some(path) = &paths.env {
        return Ok(ResolvedPolicyPath {
            path: path.clone(),
            source: PolicySource::Env,
        });
    }

    let candidates = paths.defaults();
    for (path, source) in &candidates {
        if path.is_file() {
            debug!(path = %path.display(), ?source, "resolved policy file");
            return Ok(ResolvedPolicyPath {
                path: path.clone(),
                source: *source,
            });
        }
    }

    Err(PolicyError::NoPolicyFile {
        searched: candidates.into_iter().map(|(path, _)| path).collect(),
    })
}
