use anyhow::{Context, Result};
use hashnote::{DelimiterKind, ScanConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = ".hnote.toml";

/// Named annotation syntaxes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// `#name`, `#<...>`, `#(...)`
    #[default]
    Hash,
    /// `@name`, `@{...}`, `@'...'`
    At,
}

impl Preset {
    pub fn scan_config(self) -> ScanConfig {
        match self {
            Preset::Hash => ScanConfig::hash(),
            Preset::At => ScanConfig::at_sign(),
        }
    }
}

/// Command-line settings that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub preset: Option<Preset>,
    pub strict: bool,
    pub max_depth: Option<usize>,
}

/// Application configuration with layered defaults
#[derive(Debug, Clone)]
pub struct Config {
    /// Scanner and resolver settings
    pub scan: ScanConfig,

    /// File extensions picked up when walking a directory
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self { scan: ScanConfig::default(), extensions: default_extensions() }
    }
}

fn default_extensions() -> Vec<String> {
    ["js", "mjs", "cjs", "ts"].iter().map(|ext| ext.to_string()).collect()
}

impl Config {
    /// Load configuration from all sources with proper precedence:
    /// built-in defaults, then the config file, then command-line flags.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file_config = match path {
            Some(path) => Some(Self::load_from_file(path)?),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Some(Self::load_from_file(&default_path)?)
                } else {
                    None
                }
            }
        }
        .unwrap_or_default();

        // The preset picks the base syntax; individual keys refine it
        let preset = overrides.preset.or(file_config.preset).unwrap_or_default();
        let mut config = Config { scan: preset.scan_config(), ..Default::default() };
        config.merge(file_config);
        config.apply(overrides);

        config.scan.validate().context("Invalid scanner configuration")?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<PartialConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Merge partial config into this one (partial takes precedence for specified fields)
    fn merge(&mut self, other: PartialConfig) {
        if let Some(val) = other.introducer {
            self.scan.introducer = val;
        }
        if let Some(val) = other.block_delimiters {
            self.scan.block_delimiters = val;
        }
        if let Some(val) = other.special_chars {
            self.scan.special_chars = val;
        }
        if let Some(val) = other.max_nesting_depth {
            self.scan.max_nesting_depth = val;
        }
        if let Some(val) = other.disambiguator {
            self.scan.disambiguator = Some(val);
        }
        if let Some(val) = other.strict {
            self.scan.strict_attachment = val;
        }
        if let Some(val) = other.extensions {
            self.extensions = val;
        }
    }

    fn apply(&mut self, overrides: &Overrides) {
        if overrides.strict {
            self.scan.strict_attachment = true;
        }
        if let Some(depth) = overrides.max_depth {
            self.scan.max_nesting_depth = depth;
        }
    }

    /// Whether a file found while walking a directory should be scanned.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

/// Partial configuration for deserializing from TOML with optional fields
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    preset: Option<Preset>,
    introducer: Option<char>,
    block_delimiters: Option<Vec<DelimiterKind>>,
    special_chars: Option<Vec<char>>,
    max_nesting_depth: Option<usize>,
    disambiguator: Option<char>,
    strict: Option<bool>,
    extensions: Option<Vec<String>>,
}
