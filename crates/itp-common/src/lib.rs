//! Issue tracker policy common types and errors.
//!
//! This crate provides foundational types shared across the itp crates:
//! - Unified error type with stable error codes
//! - Schema versioning for machine-readable output
//! - Output format specifications

pub mod error;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
