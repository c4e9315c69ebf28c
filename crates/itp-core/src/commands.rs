//! Command implementations.
//!
//! Each command builds a [`Report`]: a JSON value for machine-readable
//! formats and a text rendering for humans.

use serde_json::{json, Value};
use std::fmt::Write as _;
use tracing::debug;

use itp_common::{Error, OutputFormat, Result, SCHEMA_VERSION};
use itp_config::{
    new_issue_properties, policy_schema, resolve_labels, resolve_policy_path,
    resolve_tracker_labels, ConfigPaths, IssueContext, LabelContext, LoadedPolicy, StatusKey,
};

use crate::cli::{Cli, Command, LabelsArgs};
use crate::exit_codes::ExitCode;

/// Command output in both renderings.
#[derive(Debug)]
pub struct Report {
    pub json: Value,
    pub text: String,
}

impl Report {
    /// Render for the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Text => self.text.clone(),
            OutputFormat::Json => serde_json::to_string_pretty(&self.json)?,
            OutputFormat::Yaml => serde_yaml::to_string(&self.json)
                .map_err(|e| Error::Render(format!("YAML: {e}")))?,
        })
    }
}

/// Run the parsed command line, printing its output, and return the exit code.
pub fn run(cli: &Cli) -> ExitCode {
    match execute(cli).and_then(|report| report.render(cli.format)) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::Clean
        }
        Err(err) => {
            let code = ExitCode::for_error(&err);
            if cli.format.is_machine_readable() {
                let body = json!({
                    "schema_version": SCHEMA_VERSION,
                    "error": { "code": err.code(), "message": err.to_string() },
                });
                println!("{body}");
            }
            eprintln!("error: {err}");
            code
        }
    }
}

/// Execute a command without printing.
pub fn execute(cli: &Cli) -> Result<Report> {
    match &cli.command {
        Command::Schema => schema(),
        Command::Validate => validate(&load(cli)?),
        Command::Projects => projects(&load(cli)?),
        Command::Show { project } => show(&load(cli)?, project),
        Command::Labels(args) => labels(&load(cli)?, args),
        Command::Status { project, key } => status(&load(cli)?, project, key),
    }
}

fn load(cli: &Cli) -> Result<LoadedPolicy> {
    let resolved = resolve_policy_path(&ConfigPaths::from_env(cli.policy.clone()))?;
    debug!(path = %resolved.path.display(), source = ?resolved.source, "loading policy");
    Ok(LoadedPolicy::from_file(&resolved.path)?)
}

fn schema() -> Result<Report> {
    let schema = policy_schema()?;
    let text = serde_json::to_string_pretty(&schema)?;
    Ok(Report { json: schema, text })
}

fn validate(policy: &LoadedPolicy) -> Result<Report> {
    let snapshot = &policy.snapshot;
    let source = snapshot
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    Ok(Report {
        json: json!({
            "schema_version": SCHEMA_VERSION,
            "valid": true,
            "snapshot": snapshot,
        }),
        text: format!(
            "{source}: OK ({} project(s), sha256 {})",
            policy.document.len(),
            snapshot.sha256
        ),
    })
}

fn projects(policy: &LoadedPolicy) -> Result<Report> {
    let mut text = String::new();
    let mut rows = Vec::new();
    for project in policy.document.projects() {
        let _ = writeln!(text, "{}\t{}", project.name, project.tracker);
        rows.push(json!({ "name": project.name, "type": project.tracker }));
    }
    Ok(Report {
        json: json!({ "schema_version": SCHEMA_VERSION, "projects": rows }),
        text,
    })
}

fn show(policy: &LoadedPolicy, name: &str) -> Result<Report> {
    let project = policy.document.project(name)?;
    let value = serde_json::to_value(project)?;
    let text = serde_yaml::to_string(project)
        .map_err(|e| Error::Render(format!("YAML: {e}")))?;
    Ok(Report {
        json: json!({ "schema_version": SCHEMA_VERSION, "project": value }),
        text,
    })
}

fn labels(policy: &LoadedPolicy, args: &LabelsArgs) -> Result<Report> {
    let project = policy.document.project(&args.project)?;

    let mut ctx = match args.date {
        Some(date) => LabelContext::new().with_date(date),
        None => LabelContext::today(),
    };
    ctx.sanitizer = args.sanitizer.clone();
    ctx.severity = args.severity.clone();
    ctx.platform = args.platform.clone();

    let issue = IssueContext {
        is_security: args.security,
        is_crash: args.crash,
        is_update: args.update,
        labels: ctx,
    };
    let labels = if args.substitute {
        resolve_tracker_labels(project, &issue)
    } else {
        resolve_labels(project, &issue)
    }
    .map_err(itp_config::PolicyError::from)?;
    let props = new_issue_properties(project, args.security, args.crash, &issue.labels)
        .map_err(itp_config::PolicyError::from)?;

    let mut text = String::new();
    if !args.update {
        let _ = writeln!(text, "status: {}", props.status);
        if !props.ccs.is_empty() {
            let _ = writeln!(text, "ccs: {}", props.ccs.join(", "));
        }
    }
    for label in &labels {
        let _ = writeln!(text, "{label}");
    }

    let mut body = json!({
        "schema_version": SCHEMA_VERSION,
        "project": project.name,
        "labels": labels,
    });
    if !args.update {
        body["status"] = json!(props.status);
        body["ccs"] = json!(props.ccs);
        body["issue_body_footer"] = json!(props.issue_body_footer);
    }
    Ok(Report { json: body, text })
}

fn status(policy: &LoadedPolicy, name: &str, key: &str) -> Result<Report> {
    let project = policy.document.project(name)?;
    let key = StatusKey::parse(key).ok_or_else(|| Error::UnknownStatus(key.to_string()))?;
    let label = project.policies.status_label(key);
    Ok(Report {
        json: json!({
            "schema_version": SCHEMA_VERSION,
            "project": project.name,
            "key": key,
            "status": label,
        }),
        text: label.to_string(),
    })
}
