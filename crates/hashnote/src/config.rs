use crate::error::ConfigError;
use crate::node::DelimiterKind;
use serde::{Deserialize, Serialize};

/// Knobs that let different annotation syntaxes share one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Marker character that starts every annotation
    pub introducer: char,

    /// Bracket kinds accepted right after the introducer to open a block
    pub block_delimiters: Vec<DelimiterKind>,

    /// Single characters accepted as a standalone annotation payload
    pub special_chars: Vec<char>,

    /// Deepest bracket nesting a block may reach, the block itself included
    pub max_nesting_depth: usize,

    /// Character that turns an introducer at offset 0 into a hashbang line
    pub hashbang_marker: Option<char>,

    /// Optional character between introducer and identifier that forces
    /// annotation reading where a private field name would otherwise win
    pub disambiguator: Option<char>,

    /// Accept `introducer` + string literal as a block (`@'...'`)
    pub quoted_blocks: bool,

    /// Reject the module-scope fallback instead of accepting it silently
    pub strict_attachment: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            introducer: '#',
            block_delimiters: vec![DelimiterKind::Paren, DelimiterKind::Angle],
            special_chars: vec!['!', '?', '^', '&', '*'],
            max_nesting_depth: 64,
            hashbang_marker: Some('!'),
            disambiguator: None,
            quoted_blocks: false,
            strict_attachment: false,
        }
    }
}

impl ScanConfig {
    /// `#<...>`, `#(...)` and `#name`
    pub fn hash() -> Self {
        Self::default()
    }

    /// `@{...}`, `@'...'` and `@name`
    pub fn at_sign() -> Self {
        Self {
            introducer: '@',
            block_delimiters: vec![DelimiterKind::Curly],
            quoted_blocks: true,
            hashbang_marker: None,
            ..Self::default()
        }
    }

    pub fn with_strict_attachment(mut self, strict: bool) -> Self {
        self.strict_attachment = strict;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn accepts_block(&self, kind: DelimiterKind) -> bool {
        self.block_delimiters.contains(&kind)
    }

    pub fn is_special(&self, ch: char) -> bool {
        self.special_chars.contains(&ch)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroNestingDepth);
        }
        if self.block_delimiters.is_empty() {
            return Err(ConfigError::NoBlockDelimiters);
        }
        let ch = self.introducer;
        if DelimiterKind::is_bracket(ch)
            || matches!(ch, '\'' | '"' | '`')
            || ch.is_alphanumeric()
            || ch == '_'
            || ch.is_whitespace()
        {
            return Err(ConfigError::InvalidIntroducer(ch));
        }
        if let Some(&bad) = self
            .special_chars
            .iter()
            .find(|c| DelimiterKind::is_bracket(**c) || c.is_alphanumeric() || **c == '_')
        {
            return Err(ConfigError::InvalidSpecialChar(bad));
        }
        Ok(())
    }
}
