//! Block scanner: recognizes one annotation starting at an introducer.
//!
//! The scanner is a forward state machine with a single bracket stack. It
//! never recurses, so nesting depth is bounded by
//! [`ScanConfig::max_nesting_depth`] instead of the call stack.
//!
//! Context sensitivity is limited to two lookaround rules on identifier-form
//! annotations:
//! - directly after `.` the text is a property access, never an annotation;
//! - where a class body expects a member name (reported by the host through
//!   [`ScanContext::member_start`]) `#name` is a private field.

use crate::config::ScanConfig;
use crate::error::{MalformedAnnotation, Position};
use crate::node::{AnnotationNode, DelimiterKind, Introducer, TrailingMarker};
use crate::span::SourceSpan;
use crate::syntax::{Atom, EcmaSyntax, HostSyntax};
use log::{debug, trace};

/// Host-supplied facts about the introducer's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanContext {
    /// The cursor sits directly in a class body where a member name is expected
    pub member_start: bool,
}

pub type ScanResult = std::result::Result<Option<AnnotationNode>, MalformedAnnotation>;

pub struct BlockScanner<'a, S = EcmaSyntax> {
    source: &'a str,
    config: &'a ScanConfig,
    syntax: S,
}

impl<'a> BlockScanner<'a, EcmaSyntax> {
    pub fn new(source: &'a str, config: &'a ScanConfig) -> Self {
        Self::with_syntax(source, config, EcmaSyntax)
    }
}

impl<'a, S: HostSyntax> BlockScanner<'a, S> {
    pub fn with_syntax(source: &'a str, config: &'a ScanConfig, syntax: S) -> Self {
        Self { source, config, syntax }
    }

    pub fn syntax(&self) -> &S {
        &self.syntax
    }

    /// Scan the annotation whose introducer sits at byte offset `pos`.
    ///
    /// Returns `Ok(None)` when the introducer does not start an annotation
    /// here (it is ordinary host text). On success the cursor advances to
    /// `node.span.end`.
    pub fn scan_at(&self, pos: usize, ctx: ScanContext) -> ScanResult {
        if self.char_at(pos) != Some(self.config.introducer) {
            return Ok(None);
        }
        let after = pos + self.config.introducer.len_utf8();
        let next = self.char_at(after);

        if pos == 0 {
            if let (Some(marker), Some(ch)) = (self.config.hashbang_marker, next) {
                if ch == marker {
                    return Ok(Some(self.scan_hashbang(after + ch.len_utf8())));
                }
            }
        }

        if let Some(ch) = next {
            if let Some(kind) = DelimiterKind::from_open(ch) {
                if self.config.accepts_block(kind) {
                    return self.scan_block(pos, after, kind).map(Some);
                }
            }
            if self.config.quoted_blocks && self.syntax.is_quote(ch) {
                return self.scan_quoted(pos, after);
            }
        }

        Ok(self.scan_word(pos, after, ctx))
    }

    fn scan_hashbang(&self, body_start: usize) -> AnnotationNode {
        let line_end = self.source[body_start..].find('\n').map_or(self.source.len(), |i| body_start + i);
        let body_end = if self.source[..line_end].ends_with('\r') { line_end - 1 } else { line_end };
        trace!("hashbang annotation ending at {}", body_end);

        AnnotationNode::new(
            SourceSpan::new(0, body_end),
            Introducer::Hashbang,
            &self.source[body_start..body_end],
            SourceSpan::new(body_start, body_end),
        )
    }

    fn scan_block(&self, start: usize, open_at: usize, kind: DelimiterKind) -> Result<AnnotationNode, MalformedAnnotation> {
        let body_start = open_at + 1; // Skip the opening bracket
        let limit = self.config.max_nesting_depth;
        let mut stack: Vec<DelimiterKind> = Vec::new();
        let mut i = body_start;

        if limit == 0 {
            return Err(MalformedAnnotation::NestingTooDeep { limit, pos: self.position(open_at) });
        }

        trace!("block annotation {} opened at {}", kind, start);

        loop {
            let Some(ch) = self.char_at(i) else {
                return Err(MalformedAnnotation::UnterminatedBlock { open: kind.open(), pos: self.position(start) });
            };

            match self.syntax.string_literal(self.source, i) {
                Some(Atom::Closed(end)) => {
                    i = end;
                    continue;
                }
                Some(Atom::Unterminated) => {
                    return Err(MalformedAnnotation::UnterminatedString { pos: self.position(i) });
                }
                None => {}
            }

            match self.syntax.block_comment(self.source, i) {
                Some(Atom::Closed(end)) => {
                    i = end;
                    continue;
                }
                Some(Atom::Unterminated) => {
                    return Err(MalformedAnnotation::UnterminatedComment { pos: self.position(i) });
                }
                None => {}
            }

            // `=>` and `->` are arrows, not closing angles
            if ch == '>' && i > body_start && matches!(self.source.as_bytes()[i - 1], b'=' | b'-') {
                i += 1;
                continue;
            }

            if let Some(open) = DelimiterKind::from_open(ch) {
                // The block itself counts as the first level
                if stack.len() + 2 > limit {
                    return Err(MalformedAnnotation::NestingTooDeep { limit, pos: self.position(i) });
                }
                stack.push(open);
            } else if let Some(close) = DelimiterKind::from_close(ch) {
                match stack.last() {
                    Some(&top) if top == close => {
                        stack.pop();
                    }
                    Some(&top) => {
                        return Err(MalformedAnnotation::MismatchedDelimiter {
                            expected: top.close(),
                            found: ch,
                            pos: self.position(i),
                        });
                    }
                    None if close == kind => {
                        trace!("block annotation {} closed at {}", kind, i);
                        return Ok(AnnotationNode::new(
                            SourceSpan::new(start, i + 1),
                            Introducer::Block { delimiter: kind },
                            &self.source[body_start..i],
                            SourceSpan::new(body_start, i),
                        ));
                    }
                    None => {
                        return Err(MalformedAnnotation::MismatchedDelimiter {
                            expected: kind.close(),
                            found: ch,
                            pos: self.position(i),
                        });
                    }
                }
            }

            i += ch.len_utf8();
        }
    }

    fn scan_quoted(&self, start: usize, quote_at: usize) -> ScanResult {
        let Some(atom) = self.syntax.string_literal(self.source, quote_at) else {
            return Ok(None);
        };
        match atom {
            Atom::Closed(end) => {
                let quote = self.char_at(quote_at).unwrap_or('\'');
                let body_start = quote_at + quote.len_utf8();
                let body_end = end - quote.len_utf8();
                Ok(Some(AnnotationNode::new(
                    SourceSpan::new(start, end),
                    Introducer::Quoted { quote },
                    &self.source[body_start..body_end],
                    SourceSpan::new(body_start, body_end),
                )))
            }
            Atom::Unterminated => Err(MalformedAnnotation::UnterminatedString { pos: self.position(quote_at) }),
        }
    }

    /// Identifier or special-character form. Never fails: anything that
    /// does not fit is ordinary host text.
    fn scan_word(&self, start: usize, after: usize, ctx: ScanContext) -> Option<AnnotationNode> {
        let mut i = after;
        let mut disambiguated = false;
        if let Some(d) = self.config.disambiguator {
            if self.char_at(i) == Some(d) {
                i += d.len_utf8();
                disambiguated = true;
            }
        }

        let ch = self.char_at(i)?;
        let (introducer, payload_end) = if self.syntax.is_identifier_start(ch) {
            if self.follows_member_access(start) {
                trace!("introducer at {} follows '.', property access", start);
                return None;
            }
            if ctx.member_start && !disambiguated {
                trace!("introducer at {} names a private field", start);
                return None;
            }
            let mut end = i + ch.len_utf8();
            while let Some(c) = self.char_at(end) {
                if !self.syntax.is_identifier_continue(c) {
                    break;
                }
                end += c.len_utf8();
            }
            (Introducer::Identifier, end)
        } else if self.config.is_special(ch) {
            (Introducer::Special, i + ch.len_utf8())
        } else {
            debug!("introducer at {} not followed by an annotation form", start);
            return None;
        };

        let (trailing, end) = self.trailing_marker(payload_end);
        Some(
            AnnotationNode::new(
                SourceSpan::new(start, end),
                introducer,
                &self.source[i..payload_end],
                SourceSpan::new(i, payload_end),
            )
            .with_trailing(trailing),
        )
    }

    /// Fold an immediately following `?` and/or `!` into the node.
    fn trailing_marker(&self, at: usize) -> (Option<TrailingMarker>, usize) {
        let mut marker = TrailingMarker::default();
        let mut end = at;
        while let Some(ch) = self.char_at(end) {
            match ch {
                '?' if !marker.optional => marker.optional = true,
                '!' if !marker.non_null => marker.non_null = true,
                _ => break,
            }
            end += 1;
        }
        if end == at {
            (None, at)
        } else {
            (Some(marker), end)
        }
    }

    fn follows_member_access(&self, pos: usize) -> bool {
        self.source[..pos].ends_with('.')
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..)?.chars().next()
    }

    fn position(&self, offset: usize) -> Position {
        Position::locate(self.source, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> ScanResult {
        let config = ScanConfig::default();
        BlockScanner::new(source, &config).scan_at(source.find('#').unwrap(), ScanContext::default())
    }

    fn node(source: &str) -> AnnotationNode {
        scan(source).unwrap().expect("annotation")
    }

    #[test]
    fn test_identifier_form() {
        let n = node("let x #string;");
        assert_eq!(n.payload, "string");
        assert_eq!(n.introducer, Introducer::Identifier);
        assert_eq!(n.span, SourceSpan::new(6, 13));
        assert_eq!(n.trailing, None);
    }

    #[test]
    fn test_trailing_markers_fold() {
        let n = node("x #User?! ");
        assert_eq!(n.payload, "User");
        assert_eq!(n.trailing, Some(TrailingMarker { optional: true, non_null: true }));
        assert_eq!(n.span.end, 9);
    }

    #[test]
    fn test_repeated_marker_not_folded_twice() {
        let n = node("#T??");
        assert_eq!(n.span, SourceSpan::new(0, 3));
    }

    #[test]
    fn test_special_char_form() {
        let n = node("x #^ y");
        assert_eq!(n.introducer, Introducer::Special);
        assert_eq!(n.payload, "^");
    }

    #[test]
    fn test_block_angle() {
        let n = node("#<interface P { a #string }> rest");
        assert_eq!(n.payload, "interface P { a #string }");
        assert_eq!(n.introducer, Introducer::Block { delimiter: DelimiterKind::Angle });
        assert_eq!(n.span, SourceSpan::new(0, 28));
    }

    #[test]
    fn test_block_paren_with_nested_annotation() {
        let n = node("#(#(inner) (x))");
        assert_eq!(n.payload, "#(inner) (x)");
    }

    #[test]
    fn test_block_ignores_brackets_in_strings() {
        let n = node("#<a \")>\" b>");
        assert_eq!(n.payload, "a \")>\" b");
    }

    #[test]
    fn test_block_ignores_brackets_in_comments() {
        let n = node("#<a /* ) */ b>");
        assert_eq!(n.payload, "a /* ) */ b");
    }

    #[test]
    fn test_block_arrow_is_not_a_close() {
        let n = node("#<type F = (x: number) => string> f");
        assert_eq!(n.payload, "type F = (x: number) => string");
    }

    #[test]
    fn test_unterminated_block() {
        match scan("#<( unterminated") {
            Err(MalformedAnnotation::UnterminatedBlock { open: '<', pos }) => {
                assert_eq!(pos.offset, 0)
            }
            other => panic!("Expected UnterminatedBlock, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_close() {
        match scan("#<a (b]>") {
            Err(MalformedAnnotation::MismatchedDelimiter { expected: ')', found: ']', .. }) => (),
            other => panic!("Expected MismatchedDelimiter, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_close_on_empty_stack() {
        match scan("#<a ) b>") {
            Err(MalformedAnnotation::MismatchedDelimiter { expected: '>', found: ')', .. }) => (),
            other => panic!("Expected MismatchedDelimiter, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_in_block() {
        match scan("#<a 'b>\n") {
            Err(MalformedAnnotation::UnterminatedString { .. }) => (),
            other => panic!("Expected UnterminatedString, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let config = ScanConfig::default().with_max_nesting_depth(2);
        let scanner = BlockScanner::new("#<a (b) c>", &config);
        assert!(scanner.scan_at(0, ScanContext::default()).unwrap().is_some());

        let scanner = BlockScanner::new("#<a (b [c]) d>", &config);
        match scanner.scan_at(0, ScanContext::default()) {
            Err(MalformedAnnotation::NestingTooDeep { limit: 2, pos }) => assert_eq!(pos.offset, 7),
            other => panic!("Expected NestingTooDeep, got {:?}", other),
        }
    }

    #[test]
    fn test_hashbang_only_at_offset_zero() {
        let n = node("#!/usr/bin/env node\nlet x");
        assert_eq!(n.introducer, Introducer::Hashbang);
        assert_eq!(n.payload, "/usr/bin/env node");
        assert_eq!(n.span, SourceSpan::new(0, 19));

        let n = node(" #!");
        assert_eq!(n.introducer, Introducer::Special);
    }

    #[test]
    fn test_hashbang_strips_carriage_return() {
        let n = node("#!node\r\nx");
        assert_eq!(n.payload, "node");
        assert_eq!(n.span.end, 6);
    }

    #[test]
    fn test_member_access_is_not_annotation() {
        assert_eq!(scan("this.#count").unwrap(), None);
    }

    #[test]
    fn test_private_field_at_member_start() {
        let config = ScanConfig::default();
        let source = "class A { #count }";
        let scanner = BlockScanner::new(source, &config);
        let ctx = ScanContext { member_start: true };
        assert_eq!(scanner.scan_at(10, ctx).unwrap(), None);
        // A block annotation is still fine there
        let source = "class A { #<readonly> #count }";
        let scanner = BlockScanner::new(source, &config);
        assert!(scanner.scan_at(10, ctx).unwrap().is_some());
    }

    #[test]
    fn test_disambiguator_overrides_private_field() {
        let config = ScanConfig { disambiguator: Some(':'), ..Default::default() };
        let scanner = BlockScanner::new("#:number", &config);
        let n = scanner.scan_at(0, ScanContext { member_start: true }).unwrap().unwrap();
        assert_eq!(n.payload, "number");
        assert_eq!(n.payload_span, SourceSpan::new(2, 8));
    }

    #[test]
    fn test_not_an_annotation() {
        assert_eq!(scan("a # b").unwrap(), None);
        assert_eq!(scan("#1").unwrap(), None);
        assert_eq!(scan("x #").unwrap(), None);
    }

    #[test]
    fn test_at_sign_variant() {
        let config = ScanConfig::at_sign();
        let scanner = BlockScanner::new("@{ a: { b } } @'x > y' @T", &config);
        let block = scanner.scan_at(0, ScanContext::default()).unwrap().unwrap();
        assert_eq!(block.payload, " a: { b } ");
        let quoted = scanner.scan_at(14, ScanContext::default()).unwrap().unwrap();
        assert_eq!(quoted.payload, "x > y");
        assert_eq!(quoted.introducer, Introducer::Quoted { quote: '\'' });
        let ident = scanner.scan_at(23, ScanContext::default()).unwrap().unwrap();
        assert_eq!(ident.payload, "T");
    }

    #[test]
    fn test_block_delimiter_not_enabled() {
        // '{' is not a block opener for the hash variant
        assert_eq!(scan("#{a}").unwrap(), None);
    }
}
