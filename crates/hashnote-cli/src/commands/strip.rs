//! Strip command implementation

use anyhow::Result;
use hashnote::{extract, strip_annotations};
use hashnote_cli::errors::print_diagnostic;
use hashnote_cli::{collect_inputs, Config};
use std::io::Write;
use tracing::info;

pub fn strip_file(config: &Config, path: &str) -> Result<()> {
    for input in collect_inputs(&[path.to_string()], config)? {
        info!("stripping {}", input.name());
        let source = input.read()?;
        let extraction = extract(&source, &config.scan);
        for diagnostic in &extraction.diagnostics {
            print_diagnostic(&input.name(), diagnostic);
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(strip_annotations(&source, &extraction.nodes).as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
