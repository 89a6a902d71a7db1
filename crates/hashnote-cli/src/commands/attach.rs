//! Attach command implementation

use anyhow::{Context, Result};
use colored::*;
use hashnote::{analyze, Analysis, LineIndex};
use hashnote_cli::errors::print_diagnostic;
use hashnote_cli::{collect_inputs, render, Config, FileReport, OutputFormat};
use tracing::info;

pub fn attach_files(config: &Config, paths: &[String], format: OutputFormat) -> Result<()> {
    let inputs = collect_inputs(paths, config)?;
    let mut reports = Vec::with_capacity(inputs.len());

    for input in &inputs {
        info!("resolving {}", input.name());
        let source = input.read()?;
        let analysis = analyze(&source, &config.scan)
            .with_context(|| format!("Failed to attach annotations in {}", input.name()))?;
        reports.push((input.name(), source, analysis));
    }

    if format != OutputFormat::Text {
        let reports: Vec<_> = reports
            .into_iter()
            .map(|(file, _, analysis)| FileReport { file, body: analysis })
            .collect();
        println!("{}", render(&reports, format)?);
        return Ok(());
    }

    for (file, source, analysis) in &reports {
        print_table(file, source, analysis);
    }
    Ok(())
}

fn print_table(file: &str, source: &str, analysis: &Analysis) {
    let lines = LineIndex::new(source);

    println!("{}", file.bold());
    if analysis.table.is_empty() {
        println!("  {}", "no annotations".dimmed());
    }
    for (target, attachments) in analysis.table.iter() {
        println!("  {}", target.to_string().green());
        for attachment in attachments {
            let pos = lines.position(attachment.node.span.start);
            println!(
                "    {} {}",
                attachment.node.payload.split_whitespace().collect::<Vec<_>>().join(" "),
                format!("({}, {}:{})", attachment.rule, pos.line, pos.column).dimmed()
            );
        }
    }
    for diagnostic in &analysis.diagnostics {
        print_diagnostic(file, diagnostic);
    }
}
