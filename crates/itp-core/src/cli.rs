//! Command-line interface definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use itp_common::OutputFormat;
use std::path::PathBuf;

/// Inspect and exercise issue tracker policy files.
#[derive(Parser, Debug)]
#[command(name = "itp", version, about)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Policy file (default: $ITP_POLICY_FILE, then the user and system config dirs)
    #[arg(long, value_name = "PATH", global = true)]
    pub policy: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, env = "ITP_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate the policy file
    Validate,
    /// List projects and their tracker kinds
    Projects,
    /// Show one project's validated policy
    Show {
        /// Project name
        project: String,
    },
    /// Resolve the labels, status, and CCs for an issue
    Labels(LabelsArgs),
    /// Print the tracker status label for a canonical status key
    Status {
        /// Project name
        project: String,
        /// Canonical status (assigned, duplicate, wontfix, fixed, verified, new)
        key: String,
    },
    /// Print the JSON schema of the policy file format
    Schema,
}

#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Project name
    pub project: String,
    /// The issue is a security bug
    #[arg(long)]
    pub security: bool,
    /// The defect is a crash
    #[arg(long)]
    pub crash: bool,
    /// Updating an already-filed issue
    #[arg(long)]
    pub update: bool,
    /// Sanitizer name for %SANITIZER%
    #[arg(long)]
    pub sanitizer: Option<String>,
    /// Severity for %SEVERITY%
    #[arg(long)]
    pub severity: Option<String>,
    /// Platform for %PLATFORM%
    #[arg(long)]
    pub platform: Option<String>,
    /// Date for %YYYY-MM-DD% (default: today, UTC)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
    /// Apply the project's label substitutions
    #[arg(long)]
    pub substitute: bool,
}
