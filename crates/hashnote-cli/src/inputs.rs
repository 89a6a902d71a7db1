//! Resolve command-line path arguments into source inputs

use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// One source to analyze
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// Name used in reports
    pub fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            Input::Stdin => {
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source).context("Failed to read stdin")?;
                Ok(source)
            }
            Input::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

fn is_glob(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand arguments in order: `-` is stdin, directories are walked and
/// filtered by the configured extensions, files are taken as given, and
/// anything else is tried as a glob pattern. Duplicates are dropped.
pub fn collect_inputs(args: &[String], config: &Config) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();

    for arg in args {
        let path = PathBuf::from(arg);
        if arg == "-" {
            inputs.push(Input::Stdin);
        } else if path.is_dir() {
            let before = inputs.len();
            for entry in WalkDir::new(&path).follow_links(true).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && config.accepts(entry.path()) {
                    inputs.push(Input::File(entry.into_path()));
                }
            }
            debug!("{} matched {} file(s)", arg, inputs.len() - before);
        } else if path.is_file() {
            inputs.push(Input::File(path));
        } else if is_glob(arg) {
            let before = inputs.len();
            let paths = glob::glob(arg).with_context(|| format!("Invalid glob pattern '{}'", arg))?;
            for path in paths.flatten() {
                if path.is_file() {
                    inputs.push(Input::File(path));
                }
            }
            if inputs.len() == before {
                bail!("No files match '{}'", arg);
            }
        } else {
            bail!("Path not found: {}", arg);
        }
    }

    let mut seen = std::collections::HashSet::new();
    inputs.retain(|input| seen.insert(input.clone()));
    Ok(inputs)
}
