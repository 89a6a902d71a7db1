//! CLI argument parsing

use clap::{ArgAction, Parser, Subcommand};
use hashnote_cli::{OutputFormat, Overrides, Preset};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hnote")]
#[command(version, about = "Hash-comment annotation scanner and resolver", long_about = None)]
#[command(after_help = "Use 'hnote <command> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (defaults to ./.hnote.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Annotation syntax preset
    #[arg(long, value_enum, global = true)]
    pub preset: Option<Preset>,

    /// Report annotations that only bind by module-scope fallback
    #[arg(long, global = true)]
    pub strict: bool,

    /// Maximum bracket nesting inside a block annotation
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides { preset: self.preset, strict: self.strict, max_depth: self.max_depth }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recognized annotations
    #[command(visible_alias = "ls")]
    Scan {
        /// Files, directories or glob patterns ('-' reads stdin)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show which construct each annotation binds to
    Attach {
        /// Files, directories or glob patterns ('-' reads stdin)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Report malformed annotations; exits 1 if any are found
    #[command(visible_alias = "lint")]
    Check {
        /// Files, directories or glob patterns ('-' reads stdin)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print a source file with every annotation removed
    Strip {
        /// Source file ('-' reads stdin)
        path: String,
    },
}
