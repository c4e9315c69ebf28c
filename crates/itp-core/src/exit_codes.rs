//! Exit codes for the itp CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.

/// Exit codes for itp operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// Command-line usage error (reported by clap)
    Usage = 2,

    /// Policy could not be parsed or validated
    ConfigError = 10,

    /// Requested project or status does not exist
    NotFound = 11,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Exit code for a command line clap refused; help and version output is clean.
    pub fn for_clap_error(err: &clap::Error) -> Self {
        if err.use_stderr() {
            ExitCode::Usage
        } else {
            ExitCode::Clean
        }
    }

    /// Map a library error onto the exit code reported for it.
    pub fn for_error(err: &itp_common::Error) -> Self {
        match err {
            e if e.is_config_error() => ExitCode::ConfigError,
            itp_common::Error::ProjectNotFound { .. } | itp_common::Error::UnknownStatus(_) => {
                ExitCode::NotFound
            }
            itp_common::Error::Io(_) => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
