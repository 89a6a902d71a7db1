//! Recognition and attachment of hash-comment annotations.
//!
//! Annotations are regions the host language treats as comments but which
//! carry a payload for external tools: `#name`, `#?`, `#<...>`, `#(...)`, or
//! with the `@` preset `@{...}` and `@'...'`. The engine runs in three
//! stages over one source file:
//!
//! 1. [`HostLexer`] tokenizes host text and calls [`BlockScanner`] at every
//!    introducer, yielding [`AnnotationNode`]s plus diagnostics for malformed
//!    ones;
//! 2. [`Skeleton`] records the declaration sites of the token stream;
//! 3. [`Resolver`] binds every node to exactly one [`BindingTarget`].
//!
//! [`analyze`] runs all three.

pub mod config;
pub mod error;
pub mod lexer;
pub mod node;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod skeleton;
pub mod span;
pub mod strip;
pub mod syntax;
pub mod table;
pub mod target;

// Re-export commonly used items
pub use config::ScanConfig;
pub use error::{ConfigError, Error, MalformedAnnotation, Position, Result};
pub use lexer::{extract, Extraction, HostLexer, HostToken, TokenKind};
pub use node::{AnnotationNode, DelimiterKind, Introducer, TrailingMarker};
pub use pipeline::{analyze, analyze_with, Analysis};
pub use resolver::Resolver;
pub use scanner::{BlockScanner, ScanContext};
pub use skeleton::{Anchor, ListClause, Skeleton};
pub use span::{LineIndex, SourceSpan};
pub use strip::strip_annotations;
pub use syntax::{Atom, EcmaSyntax, HostSyntax};
pub use table::{AnnotationTable, AttachRule, Attachment};
pub use target::BindingTarget;
