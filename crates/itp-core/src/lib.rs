//! itp: command-line front end for issue tracker policy files.
//!
//! The binary is a thin wrapper; everything testable lives here.

pub mod cli;
pub mod commands;
pub mod exit_codes;
pub mod logging;

pub use cli::Cli;
pub use exit_codes::ExitCode;
