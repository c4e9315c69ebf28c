//! Label template rendering.
//!
//! A label template is a literal label that may carry one placeholder token,
//! e.g. `Stability-%SANITIZER%` or `Reported-%YYYY-MM-DD%`. The same token may
//! repeat; two different tokens in one template are rejected.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Placeholder tokens recognised inside label templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    Date,
    Sanitizer,
    Severity,
    Platform,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Date,
        Placeholder::Sanitizer,
        Placeholder::Severity,
        Placeholder::Platform,
    ];

    /// Literal token as written in a template.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Date => "%YYYY-MM-DD%",
            Placeholder::Sanitizer => "%SANITIZER%",
            Placeholder::Severity => "%SEVERITY%",
            Placeholder::Platform => "%PLATFORM%",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Date => write!(f, "date"),
            Placeholder::Sanitizer => write!(f, "sanitizer"),
            Placeholder::Severity => write!(f, "severity"),
            Placeholder::Platform => write!(f, "platform"),
        }
    }
}

/// Errors from parsing or rendering a label template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unrecognized placeholder {token} in label template {template:?}")]
    UnknownPlaceholder { template: String, token: String },

    #[error("label template {template:?} mixes placeholders {first} and {second}")]
    MultiplePlaceholders {
        template: String,
        first: Placeholder,
        second: Placeholder,
    },

    #[error("no {placeholder} value available to render label template {template:?}")]
    MissingValue {
        template: String,
        placeholder: Placeholder,
    },
}

/// Per-issue values substituted into label templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelContext {
    pub date: Option<NaiveDate>,
    pub sanitizer: Option<String>,
    pub severity: Option<String>,
    pub platform: Option<String>,
}

impl LabelContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context dated today (UTC).
    pub fn today() -> Self {
        Self::new().with_date(chrono::Utc::now().date_naive())
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: impl Into<String>) -> Self {
        self.sanitizer = Some(sanitizer.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    fn value(&self, placeholder: Placeholder) -> Option<String> {
        match placeholder {
            Placeholder::Date => self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            Placeholder::Sanitizer => self.sanitizer.clone(),
            Placeholder::Severity => self.severity.clone(),
            Placeholder::Platform => self.platform.clone(),
        }
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%[A-Za-z][A-Za-z0-9_-]*%").expect("placeholder pattern is valid")
    })
}

/// The single placeholder a template uses, if any.
pub fn placeholder_of(template: &str) -> Result<Option<Placeholder>, TemplateError> {
    let mut found: Option<Placeholder> = None;
    for m in token_pattern().find_iter(template) {
        let placeholder =
            Placeholder::from_token(m.as_str()).ok_or_else(|| TemplateError::UnknownPlaceholder {
                template: template.to_string(),
                token: m.as_str().to_string(),
            })?;
        match found {
            Some(first) if first != placeholder => {
                return Err(TemplateError::MultiplePlaceholders {
                    template: template.to_string(),
                    first,
                    second: placeholder,
                });
            }
            _ => found = Some(placeholder),
        }
    }
    Ok(found)
}

/// Render a label template against a context.
pub fn render_label(template: &str, context: &LabelContext) -> Result<String, TemplateError> {
    let Some(placeholder) = placeholder_of(template)? else {
        return Ok(template.to_string());
    };
    let value = context
        .value(placeholder)
        .ok_or_else(|| TemplateError::MissingValue {
            template: template.to_string(),
            placeholder,
        })?;
    Ok(template.replace(placeholder.token(), &value))
}
