//! Machine-readable report rendering

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when writing to a terminal
    #[default]
    Text,
    Json,
    Yaml,
}

/// One file's worth of command output
#[derive(Debug, Serialize)]
pub struct FileReport<T: Serialize> {
    pub file: String,
    #[serde(flatten)]
    pub body: T,
}

/// Render `value` as JSON or YAML. Text output is written by each command.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).context("Failed to serialize JSON"),
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize YAML"),
        OutputFormat::Text => anyhow::bail!("Text output has no generic renderer"),
    }
}
