use crate::span::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Paired bracket kinds tracked inside a block annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterKind {
    Paren,
    Angle,
    Square,
    Curly,
}

impl DelimiterKind {
    pub const ALL: [DelimiterKind; 4] =
        [DelimiterKind::Paren, DelimiterKind::Angle, DelimiterKind::Square, DelimiterKind::Curly];

    pub fn open(self) -> char {
        match self {
            DelimiterKind::Paren => '(',
            DelimiterKind::Angle => '<',
            DelimiterKind::Square => '[',
            DelimiterKind::Curly => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            DelimiterKind::Paren => ')',
            DelimiterKind::Angle => '>',
            DelimiterKind::Square => ']',
            DelimiterKind::Curly => '}',
        }
    }

    pub fn from_open(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.open() == ch)
    }

    pub fn from_close(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.close() == ch)
    }

    pub fn is_bracket(ch: char) -> bool {
        Self::from_open(ch).is_some() || Self::from_close(ch).is_some()
    }
}

impl fmt::Display for DelimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.open(), self.close())
    }
}

/// How an annotation was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Introducer {
    /// `#!...` on the first line of a file
    Hashbang,
    Block { delimiter: DelimiterKind },
    /// `@'...'`, the payload is the literal's body
    Quoted { quote: char },
    Identifier,
    Special,
}

impl Introducer {
    pub fn name(&self) -> &'static str {
        match self {
            Introducer::Hashbang => "hashbang",
            Introducer::Block { .. } => "block",
            Introducer::Quoted { .. } => "quoted",
            Introducer::Identifier => "identifier",
            Introducer::Special => "special",
        }
    }
}

impl fmt::Display for Introducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Introducer::Block { delimiter } => write!(f, "block {}", delimiter),
            Introducer::Quoted { quote } => write!(f, "quoted {}", quote),
            other => f.write_str(other.name()),
        }
    }
}

/// `?` and/or `!` folded onto an identifier or special-char annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TrailingMarker {
    pub optional: bool, // '?'
    pub non_null: bool, // '!'
}

impl fmt::Display for TrailingMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str("?")?;
        }
        if self.non_null {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// One recognized annotation. Immutable once the scanner hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AnnotationNode {
    /// Everything consumed, introducer and terminator included
    pub span: SourceSpan,
    pub introducer: Introducer,
    pub payload: String,
    pub payload_span: SourceSpan,
    pub trailing: Option<TrailingMarker>,
}

impl AnnotationNode {
    pub fn new(
        span: SourceSpan,
        introducer: Introducer,
        payload: impl Into<String>,
        payload_span: SourceSpan,
    ) -> Self {
        Self { span, introducer, payload: payload.into(), payload_span, trailing: None }
    }

    pub fn with_trailing(mut self, trailing: Option<TrailingMarker>) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn is_block(&self) -> bool {
        matches!(self.introducer, Introducer::Block { .. })
    }
}
