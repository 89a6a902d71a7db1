//! Attachment resolver: binds every recognized annotation to exactly one
//! [`BindingTarget`].
//!
//! A single linear pass over the annotation tokens. For each one, in order:
//!
//! 1. the previous non-annotation token on the same line, if it carries a
//!    trailing anchor, is the preceding candidate;
//! 2. with no preceding candidate, a blank line (or end of input) before the
//!    next host token makes the annotation module-level;
//! 3. a preceding candidate wins over anything that follows;
//! 4. an annotation filling a whole name slot of an import/export list names
//!    the specifier itself;
//! 5. otherwise the next host token, past declaration modifiers, may carry a
//!    leading anchor;
//! 6. anything left falls back to module scope.

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::lexer::{HostToken, TokenKind};
use crate::node::{AnnotationNode, Introducer};
use crate::skeleton::Skeleton;
use crate::span::LineIndex;
use crate::table::{AnnotationTable, AttachRule, Attachment};
use crate::target::BindingTarget;
use log::trace;

/// Words skipped when looking for the construct an annotation precedes
const LEADING_MODIFIERS: &[&str] =
    &["let", "const", "var", "export", "static", "get", "set", "async", "readonly", "accessor", "declare"];

pub struct Resolver<'a> {
    source: &'a str,
    tokens: &'a [HostToken],
    nodes: &'a [AnnotationNode],
    skeleton: &'a Skeleton,
    strict: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(
        source: &'a str,
        tokens: &'a [HostToken],
        nodes: &'a [AnnotationNode],
        skeleton: &'a Skeleton,
        config: &ScanConfig,
    ) -> Self {
        Self { source, tokens, nodes, skeleton, strict: config.strict_attachment }
    }

    pub fn resolve(&self) -> Result<AnnotationTable> {
        let mut table = AnnotationTable::new();
        let mut lines: Option<LineIndex<'_>> = None;

        for (index, token) in self.tokens.iter().enumerate() {
            let TokenKind::Annotation(node_index) = token.kind else { continue };
            let Some(node) = self.nodes.get(node_index) else { continue };

            let (target, rule) = self.bind(index, node);
            trace!("'{}' at {} -> {} ({})", node.payload, node.span.start, target, rule);

            if rule == AttachRule::Fallback && self.strict {
                let lines = lines.get_or_insert_with(|| LineIndex::new(self.source));
                return Err(Error::AmbiguousAttachment {
                    payload: node.payload.clone(),
                    pos: lines.position(node.span.start),
                });
            }
            table.insert(target, Attachment { node: node.clone(), rule });
        }

        Ok(table)
    }

    fn bind(&self, index: usize, node: &AnnotationNode) -> (BindingTarget, AttachRule) {
        if node.introducer == Introducer::Hashbang {
            return (BindingTarget::ModuleScope, AttachRule::Isolated);
        }

        if let Some(anchor) = self.preceding(index).and_then(|j| self.skeleton.trailing(j)) {
            return (anchor.target(), AttachRule::Trailing);
        }

        if self.isolated(index) {
            return (BindingTarget::ModuleScope, AttachRule::Isolated);
        }

        if let Some(clause) = self.skeleton.list_slot(index) {
            return (clause.target(&node.payload), AttachRule::ListSlot);
        }

        if let Some(anchor) = self.following(index).and_then(|j| self.skeleton.leading(j)) {
            return (anchor.target(), AttachRule::Leading);
        }

        (BindingTarget::ModuleScope, AttachRule::Fallback)
    }

    /// Previous host token on the same line, looking through stacked
    /// annotations.
    fn preceding(&self, index: usize) -> Option<usize> {
        let mut j = index;
        while j > 0 {
            if self.tokens[j].newlines_before > 0 {
                return None;
            }
            j -= 1;
            if !self.tokens[j].is_annotation() {
                return Some(j);
            }
        }
        None
    }

    /// A blank line separates the annotation from the next host token, or
    /// no host token follows at all.
    fn isolated(&self, index: usize) -> bool {
        for token in &self.tokens[index + 1..] {
            if token.newlines_before >= 2 {
                return true;
            }
            if !token.is_annotation() {
                return false;
            }
        }
        true
    }

    fn following(&self, index: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, t)| {
                !t.is_annotation()
                    && !t.is_punct(".")
                    && !(matches!(t.kind, TokenKind::Ident | TokenKind::Keyword)
                        && LEADING_MODIFIERS.contains(&t.text.as_str()))
            })
            .map(|(j, _)| j)
    }
}
