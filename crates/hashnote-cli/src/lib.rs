//! Command-line front end for the hashnote annotation engine
//!
//! Shared pieces of the `hnote` binary: layered configuration, input
//! collection, report rendering and error printing.

pub mod config;
pub mod errors;
pub mod inputs;
pub mod output;

pub use config::{Config, Overrides, Preset};
pub use inputs::{collect_inputs, Input};
pub use output::{render, FileReport, OutputFormat};

/// Re-export common error types
pub use anyhow::{Error, Result};
