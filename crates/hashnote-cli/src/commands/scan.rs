//! Scan command implementation

use anyhow::Result;
use colored::*;
use hashnote::{extract, AnnotationNode, Introducer, LineIndex, Position};
use hashnote_cli::errors::print_diagnostic;
use hashnote_cli::{collect_inputs, render, Config, FileReport, OutputFormat};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct NodeView<'a> {
    position: Position,
    #[serde(flatten)]
    node: &'a AnnotationNode,
}

#[derive(Debug, Serialize)]
struct ScanBody<'a> {
    nodes: Vec<NodeView<'a>>,
    diagnostics: &'a [hashnote::Error],
}

pub fn scan_files(config: &Config, paths: &[String], format: OutputFormat) -> Result<()> {
    let inputs = collect_inputs(paths, config)?;
    let mut extracted = Vec::with_capacity(inputs.len());

    for input in &inputs {
        info!("scanning {}", input.name());
        let source = input.read()?;
        let extraction = extract(&source, &config.scan);
        let positions: Vec<Position> = {
            let lines = LineIndex::new(&source);
            extraction.nodes.iter().map(|n| lines.position(n.span.start)).collect()
        };
        extracted.push((input.name(), extraction, positions));
    }

    if format != OutputFormat::Text {
        let reports: Vec<_> = extracted
            .iter()
            .map(|(file, extraction, positions)| FileReport {
                file: file.clone(),
                body: ScanBody {
                    nodes: positions
                        .iter()
                        .zip(&extraction.nodes)
                        .map(|(position, node)| NodeView { position: *position, node })
                        .collect(),
                    diagnostics: &extraction.diagnostics,
                },
            })
            .collect();
        println!("{}", render(&reports, format)?);
        return Ok(());
    }

    for (file, extraction, positions) in &extracted {
        println!("{}", file.bold());
        if extraction.nodes.is_empty() {
            println!("  {}", "no annotations".dimmed());
        }
        for (position, node) in positions.iter().zip(&extraction.nodes) {
            let marker = node.trailing.map(|m| m.to_string()).unwrap_or_default();
            println!(
                "  {:>4}:{:<3} {:<10} {}{}",
                position.line,
                position.column,
                form_label(node).as_str().cyan(),
                single_line(&node.payload),
                marker.as_str().yellow()
            );
        }
        for diagnostic in &extraction.diagnostics {
            print_diagnostic(file, diagnostic);
        }
    }

    Ok(())
}

fn form_label(node: &AnnotationNode) -> String {
    match node.introducer {
        Introducer::Block { delimiter } => format!("block{}", delimiter.open()),
        Introducer::Quoted { quote } => format!("quoted{}", quote),
        _ => node.introducer.name().to_string(),
    }
}

/// Collapse a multi-line payload onto one line for listing.
fn single_line(payload: &str) -> String {
    payload.split_whitespace().collect::<Vec<_>>().join(" ")
}
