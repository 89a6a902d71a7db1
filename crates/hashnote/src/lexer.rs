//! Minimal ECMAScript-flavoured host tokenizer.
//!
//! Produces just enough of a token stream for the skeleton builder and
//! calls the [`BlockScanner`] at every introducer. Malformed annotations are
//! reported as diagnostics and the introducer is re-read as ordinary text.

use crate::config::ScanConfig;
use crate::error::Error;
use crate::node::AnnotationNode;
use crate::scanner::{BlockScanner, ScanContext};
use crate::span::SourceSpan;
use crate::syntax::{Atom, EcmaSyntax, HostSyntax};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "node", rename_all = "snake_case")]
pub enum TokenKind {
    Ident,
    Keyword,
    PrivateName,
    Number,
    String,
    Regex,
    Punct,
    Arrow,
    /// Index into [`Extraction::nodes`]
    Annotation(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostToken {
    pub kind: TokenKind,
    pub text: String,
    pub span: SourceSpan,
    /// Line breaks in the trivia between the previous token and this one
    pub newlines_before: usize,
}

impl HostToken {
    pub fn is_annotation(&self) -> bool {
        matches!(self.kind, TokenKind::Annotation(_))
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    pub fn is_word(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Keyword) && self.text == text
    }
}

/// Everything one pass over a file yields
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub tokens: Vec<HostToken>,
    pub nodes: Vec<AnnotationNode>,
    pub diagnostics: Vec<Error>,
}

const KEYWORDS: &[&str] = &[
    "let", "const", "var", "function", "class", "import", "export", "return", "extends", "new",
    "this", "typeof", "default", "if", "else", "for", "while", "do", "switch", "case", "break",
    "continue", "throw", "try", "catch", "finally", "delete", "in", "instanceof", "void", "yield",
    "await", "super", "null", "true", "false",
];

/// Words that may sit between a class body's member start and the name
pub(crate) const MEMBER_MODIFIERS: &[&str] = &[
    "static", "get", "set", "async", "accessor", "readonly", "declare", "public", "private",
    "protected", "override", "abstract",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Paren,
    Square,
    Brace,
    ClassBody,
}

pub struct HostLexer<'a, S = EcmaSyntax> {
    source: &'a str,
    config: &'a ScanConfig,
    scanner: BlockScanner<'a, S>,
    pos: usize,
    scopes: Vec<Scope>,
    // Scope depth at which a `class` keyword is waiting for its body
    pending_class: Option<usize>,
    // Line breaks since the last non-annotation token
    newlines_since_significant: usize,
    out: Extraction,
}

impl<'a> HostLexer<'a, EcmaSyntax> {
    pub fn new(source: &'a str, config: &'a ScanConfig) -> Self {
        Self::with_syntax(source, config, EcmaSyntax)
    }
}

impl<'a, S: HostSyntax> HostLexer<'a, S> {
    pub fn with_syntax(source: &'a str, config: &'a ScanConfig, syntax: S) -> Self {
        Self {
            source,
            config,
            scanner: BlockScanner::with_syntax(source, config, syntax),
            pos: 0,
            scopes: Vec::new(),
            pending_class: None,
            newlines_since_significant: 0,
            out: Extraction::default(),
        }
    }

    pub fn tokenize(mut self) -> Extraction {
        loop {
            let newlines = self.skip_trivia();
            if self.is_at_end() {
                break;
            }
            self.newlines_since_significant += newlines;

            let Some(ch) = self.current_char() else { break };
            if ch == self.config.introducer {
                self.read_introducer(newlines);
            } else {
                self.read_token(ch, newlines);
            }
        }
        self.out
    }

    fn read_introducer(&mut self, newlines: usize) {
        let start = self.pos;
        let ctx = ScanContext { member_start: self.at_member_start() };

        match self.scanner.scan_at(start, ctx) {
            Ok(Some(node)) => {
                let index = self.out.nodes.len();
                let span = node.span;
                self.out.nodes.push(node);
                self.out.tokens.push(HostToken {
                    kind: TokenKind::Annotation(index),
                    text: span.slice(self.source).to_string(),
                    span,
                    newlines_before: newlines,
                });
                self.pos = span.end;
            }
            Ok(None) => self.read_plain_introducer(newlines),
            Err(err) => {
                debug!("{}; resuming after introducer at {}", err, start);
                self.out.diagnostics.push(err.into());
                self.read_plain_introducer(newlines);
            }
        }
    }

    /// The introducer as host text: a private name when an identifier
    /// follows, a lone punctuator otherwise.
    fn read_plain_introducer(&mut self, newlines: usize) {
        let start = self.pos;
        self.advance();
        let kind = match self.current_char() {
            Some(ch) if self.scanner.syntax().is_identifier_start(ch) => {
                self.read_identifier_tail();
                TokenKind::PrivateName
            }
            _ => TokenKind::Punct,
        };
        self.push(kind, start, newlines);
    }

    fn read_token(&mut self, ch: char, newlines: usize) {
        let start = self.pos;

        if let Some(atom) = self.scanner.syntax().string_literal(self.source, start) {
            self.pos = match atom {
                Atom::Closed(end) => end,
                Atom::Unterminated => self.source.len(),
            };
            self.push(TokenKind::String, start, newlines);
            return;
        }

        if ch == '/' {
            let prev = self.previous_significant().map(|t| t.text.as_str());
            if let Some(Atom::Closed(end)) = self.scanner.syntax().regex_literal(self.source, start, prev) {
                self.pos = end;
                self.push(TokenKind::Regex, start, newlines);
                return;
            }
        }

        if self.scanner.syntax().is_identifier_start(ch) {
            self.advance();
            self.read_identifier_tail();
            let kind = if KEYWORDS.contains(&&self.source[start..self.pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Ident
            };
            if &self.source[start..self.pos] == "class" && !self.is_property_name() {
                self.pending_class = Some(self.scopes.len());
            }
            self.push(kind, start, newlines);
            return;
        }

        if ch.is_ascii_digit() {
            while let Some(c) = self.current_char() {
                if c.is_alphanumeric() || c == '.' || c == '_' {
                    self.advance();
                } else {
                    break;
                }
            }
            self.push(TokenKind::Number, start, newlines);
            return;
        }

        if ch == '=' && self.peek() == Some('>') {
            self.advance();
            self.advance();
            self.push(TokenKind::Arrow, start, newlines);
            return;
        }

        self.advance();
        match ch {
            '(' => self.scopes.push(Scope::Paren),
            '[' => self.scopes.push(Scope::Square),
            '{' => {
                let scope = if self.pending_class == Some(self.scopes.len()) {
                    self.pending_class = None;
                    Scope::ClassBody
                } else {
                    Scope::Brace
                };
                self.scopes.push(scope);
            }
            ')' | ']' | '}' => {
                self.scopes.pop();
                if self.pending_class.is_some_and(|depth| depth > self.scopes.len()) {
                    self.pending_class = None;
                }
            }
            ';' if self.pending_class == Some(self.scopes.len()) => {
                self.pending_class = None;
            }
            _ => {}
        }
        self.push(TokenKind::Punct, start, newlines);
    }

    fn read_identifier_tail(&mut self) {
        while let Some(c) = self.current_char() {
            if self.scanner.syntax().is_identifier_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Whether the word just read names a property (`el.class`,
    /// `{ class: 1 }`, `class() {}`) rather than starting a class.
    fn is_property_name(&self) -> bool {
        let after_dot = self.previous_significant().is_some_and(|t| t.is_punct("."));
        let next = self.source[self.pos..].chars().find(|c| !c.is_whitespace());
        after_dot || matches!(next, Some(':' | '(' | '='))
    }

    fn previous_significant(&self) -> Option<&HostToken> {
        self.out.tokens.iter().rev().find(|t| !t.is_annotation())
    }

    /// Whether a class body expects a member name at the cursor.
    fn at_member_start(&self) -> bool {
        if self.scopes.last() != Some(&Scope::ClassBody) {
            return false;
        }
        if self.newlines_since_significant > 0 {
            return true;
        }
        match self.previous_significant() {
            None => true,
            Some(prev) => {
                matches!(prev.text.as_str(), "{" | "}" | ";")
                    || (prev.kind == TokenKind::Ident && MEMBER_MODIFIERS.contains(&prev.text.as_str()))
            }
        }
    }

    /// Skip whitespace and comments, returning the number of line breaks seen.
    fn skip_trivia(&mut self) -> usize {
        let mut newlines = 0;
        loop {
            match self.current_char() {
                Some('\n') => {
                    newlines += 1;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') => {
                    if let Some(end) = self.scanner.syntax().line_comment(self.source, self.pos) {
                        self.pos = end;
                    } else if let Some(atom) = self.scanner.syntax().block_comment(self.source, self.pos) {
                        let end = match atom {
                            Atom::Closed(end) => end,
                            Atom::Unterminated => self.source.len(),
                        };
                        newlines += self.source[self.pos..end].matches('\n').count();
                        self.pos = end;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        newlines
    }

    fn push(&mut self, kind: TokenKind, start: usize, newlines_before: usize) {
        let span = SourceSpan::new(start, self.pos);
        self.out.tokens.push(HostToken {
            kind,
            text: span.slice(self.source).to_string(),
            span,
            newlines_before,
        });
        self.newlines_since_significant = 0;
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..)?.chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.source.get(self.pos..)?.chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Tokenize `source` with the default ECMAScript host rules.
pub fn extract(source: &str, config: &ScanConfig) -> Extraction {
    HostLexer::new(source, config).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        extract(source, &ScanConfig::default()).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_annotation_token_in_stream() {
        let out = extract("let x #string;", &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
        let texts: Vec<_> = out.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["let", "x", "#string", ";"]);
        assert_eq!(out.tokens[2].kind, TokenKind::Annotation(0));
    }

    #[test]
    fn test_comments_hide_introducers() {
        let out = extract("// #a\n/* #b */ x", &ScanConfig::default());
        assert!(out.nodes.is_empty());
        assert_eq!(out.tokens.len(), 1);
        assert_eq!(out.tokens[0].newlines_before, 1);
    }

    #[test]
    fn test_strings_hide_introducers() {
        let out = extract("'#a' \"#<b>\" `#c ${d}`", &ScanConfig::default());
        assert!(out.nodes.is_empty());
        assert_eq!(out.tokens.len(), 3);
    }

    #[test]
    fn test_newline_counting() {
        let out = extract("a\n\n  #T\nb", &ScanConfig::default());
        let counts: Vec<_> = out.tokens.iter().map(|t| t.newlines_before).collect();
        assert_eq!(counts, vec![0, 2, 1]);
    }

    #[test]
    fn test_private_field_in_class_body() {
        let out = extract("class A { #count #number; m() { this.#count } }", &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].payload, "number");
        let private: Vec<_> = out
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::PrivateName)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(private, vec!["#count", "#count"]);
    }

    #[test]
    fn test_private_field_after_modifier_and_newline() {
        let source = "class A {\n  static #a\n  x #T\n  #b\n}";
        let out = extract(source, &ScanConfig::default());
        let payloads: Vec<_> = out.nodes.iter().map(|n| n.payload.as_str()).collect();
        assert_eq!(payloads, vec!["T"]);
    }

    #[test]
    fn test_class_expression_with_heritage_call() {
        let out = extract("class A extends mix({}) { #p #T }", &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].payload, "T");
    }

    #[test]
    fn test_regex_literals_hide_introducers() {
        let source = "const hex = s.replace(/^#(\\w+)$/, '$1')\nlet y = /#fff/g\n";
        let out = extract(source, &ScanConfig::default());
        assert!(out.nodes.is_empty());
        assert!(out.diagnostics.is_empty());
        let regexes: Vec<_> =
            out.tokens.iter().filter(|t| t.kind == TokenKind::Regex).map(|t| t.text.as_str()).collect();
        assert_eq!(regexes, vec![r"/^#(\w+)$/", "/#fff/g"]);
    }

    #[test]
    fn test_division_is_not_a_regex() {
        let out = extract("let r = width / 2 #number / scale", &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].payload, "number");
        assert!(out.tokens.iter().all(|t| t.kind != TokenKind::Regex));
    }

    #[test]
    fn test_class_property_does_not_open_class_body() {
        let source = "el.class = 'x'\nif (ok) {\n  #T\n  run()\n}\n";
        let out = extract(source, &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].payload, "T");
        assert!(out.tokens.iter().all(|t| t.kind != TokenKind::PrivateName));
    }

    #[test]
    fn test_class_object_key_does_not_open_class_body() {
        let out = extract("const o = { class: 'btn' }\nwhile (x) {\n  #T\n}", &ScanConfig::default());
        assert_eq!(out.nodes.len(), 1);
    }

    #[test]
    fn test_resync_after_malformed_block() {
        let out = extract("#<( unterminated", &ScanConfig::default());
        assert!(out.nodes.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.tokens[0].kind, TokenKind::Punct);
        assert_eq!(out.tokens[0].text, "#");
        assert_eq!(out.tokens[1].text, "<");
    }

    #[test]
    fn test_resync_keeps_later_annotations() {
        let out = extract("let a #<b ]>\nlet c #string", &ScanConfig::default());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].payload, "string");
    }

    #[test]
    fn test_arrow_and_numbers() {
        assert_eq!(
            kinds("x => 1.5"),
            vec![TokenKind::Ident, TokenKind::Arrow, TokenKind::Number]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(kinds("const from"), vec![TokenKind::Keyword, TokenKind::Ident]);
    }
}
