//! Check command implementation

use anyhow::Result;
use colored::*;
use hashnote::{analyze, extract};
use hashnote_cli::errors::format_diagnostic;
use hashnote_cli::{collect_inputs, render, Config, FileReport, OutputFormat};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct CheckBody {
    annotations: usize,
    diagnostics: Vec<hashnote::Error>,
}

/// Returns `Ok(false)` when any input has diagnostics.
pub fn check_files(config: &Config, paths: &[String], format: OutputFormat) -> Result<bool> {
    let inputs = collect_inputs(paths, config)?;
    let mut reports = Vec::with_capacity(inputs.len());

    for input in &inputs {
        info!("checking {}", input.name());
        let source = input.read()?;
        let body = match analyze(&source, &config.scan) {
            Ok(analysis) => CheckBody { annotations: analysis.nodes.len(), diagnostics: analysis.diagnostics },
            // Strict attachment: the rejected fallback is one more finding
            Err(err) => {
                let extraction = extract(&source, &config.scan);
                let mut diagnostics = extraction.diagnostics;
                diagnostics.push(err);
                CheckBody { annotations: extraction.nodes.len(), diagnostics }
            }
        };
        reports.push(FileReport { file: input.name(), body });
    }

    let total: usize = reports.iter().map(|r| r.body.diagnostics.len()).sum();

    if format != OutputFormat::Text {
        println!("{}", render(&reports, format)?);
        return Ok(total == 0);
    }

    for report in &reports {
        for diagnostic in &report.body.diagnostics {
            println!("{}", format_diagnostic(&report.file, diagnostic));
        }
    }

    let annotations: usize = reports.iter().map(|r| r.body.annotations).sum();
    if total == 0 {
        println!("{} {} file(s), {} annotation(s), no problems", "✓".green(), reports.len(), annotations);
    } else {
        println!("{} {} problem(s) in {} file(s)", "✗".red(), total, reports.len());
    }
    Ok(total == 0)
}
