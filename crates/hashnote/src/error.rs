use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

/// Position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub offset: usize, // Byte offset
    pub line: usize,   // Line number (1-based)
    pub column: usize, // Column number (1-based, in chars)
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }

    /// Compute the position of `offset` by walking `source` from the start.
    ///
    /// Used on error paths only; bulk lookups go through [`crate::LineIndex`].
    pub fn locate(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self::new(offset, line, column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Reasons an opened annotation could not be recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedAnnotation {
    #[error("Unterminated annotation block '{open}' opened at {pos}")]
    UnterminatedBlock { open: char, pos: Position },

    #[error("Unterminated string literal inside annotation at {pos}")]
    UnterminatedString { pos: Position },

    #[error("Unterminated comment inside annotation at {pos}")]
    UnterminatedComment { pos: Position },

    #[error("Mismatched closing '{found}' at {pos}, expected '{expected}'")]
    MismatchedDelimiter { expected: char, found: char, pos: Position },

    #[error("Annotation nesting deeper than {limit} at {pos}")]
    NestingTooDeep { limit: usize, pos: Position },
}

impl MalformedAnnotation {
    pub fn position(&self) -> Position {
        match self {
            MalformedAnnotation::UnterminatedBlock { pos, .. }
            | MalformedAnnotation::UnterminatedString { pos }
            | MalformedAnnotation::UnterminatedComment { pos }
            | MalformedAnnotation::MismatchedDelimiter { pos, .. }
            | MalformedAnnotation::NestingTooDeep { pos, .. } => *pos,
        }
    }
}

/// Engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed annotation: {0}")]
    Malformed(#[from] MalformedAnnotation),

    #[error("Ambiguous attachment for annotation '{payload}' at {pos}")]
    AmbiguousAttachment { payload: String, pos: Position },
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Malformed(inner) => inner.position(),
            Error::AmbiguousAttachment { pos, .. } => *pos,
        }
    }
}

// Diagnostics go out as `{ message, position }`
impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 2)?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("position", &self.position())?;
        state.end()
    }
}

/// Invalid scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_nesting_depth must be at least 1")]
    ZeroNestingDepth,

    #[error("Introducer '{0}' collides with a bracket, quote or identifier character")]
    InvalidIntroducer(char),

    #[error("At least one block delimiter must be enabled")]
    NoBlockDelimiters,

    #[error("Special character '{0}' is a bracket or identifier character")]
    InvalidSpecialChar(char),
}

pub type Result<T> = std::result::Result<T, Error>;
