//! Host-language character classes the scanner and host lexer rely on.
//!
//! The engine never parses host grammar beyond strings, comments, brackets
//! and identifiers; everything it needs to know about those lives behind
//! [`HostSyntax`] so other hosts can plug in their own rules.

/// Where an atomic construct (string literal, comment) ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
    /// Byte offset one past the construct's last character
    Closed(usize),
    Unterminated,
}

pub trait HostSyntax {
    /// String literal starting at `pos`, if any.
    fn string_literal(&self, source: &str, pos: usize) -> Option<Atom>;

    /// Block comment starting at `pos`, if any.
    fn block_comment(&self, source: &str, pos: usize) -> Option<Atom>;

    /// Line comment starting at `pos`; returns the offset of the line break
    /// (or end of input) that ends it.
    fn line_comment(&self, source: &str, pos: usize) -> Option<usize>;

    /// Regular-expression literal starting at `pos`, if any. `prev` is the
    /// text of the previous significant token; after an operand a slash is
    /// division.
    fn regex_literal(&self, source: &str, pos: usize, prev: Option<&str>) -> Option<Atom>;

    fn is_quote(&self, ch: char) -> bool;

    fn is_identifier_start(&self, ch: char) -> bool;

    fn is_identifier_continue(&self, ch: char) -> bool;
}

/// ECMAScript-flavoured host rules
#[derive(Debug, Clone, Copy, Default)]
pub struct EcmaSyntax;

/// Words after which a slash starts a regular expression
const REGEX_AFTER_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

#[derive(Debug, Clone, Copy)]
enum TemplateFrame {
    Text,
    Substitution { braces: usize },
}

impl EcmaSyntax {
    fn quoted(&self, bytes: &[u8], pos: usize) -> Atom {
        let quote = bytes[pos];
        let mut i = pos + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'\n' => return Atom::Unterminated,
                b if b == quote => return Atom::Closed(i + 1),
                _ => i += 1,
            }
        }
        Atom::Unterminated
    }

    fn template(&self, bytes: &[u8], pos: usize) -> Atom {
        let mut frames = vec![TemplateFrame::Text];
        let mut i = pos + 1;

        while let Some(&frame) = frames.last() {
            let Some(&byte) = bytes.get(i) else {
                return Atom::Unterminated;
            };
            match (frame, byte) {
                (TemplateFrame::Text, b'\\') => i += 2,
                (TemplateFrame::Text, b'`') => {
                    frames.pop();
                    i += 1;
                }
                (TemplateFrame::Text, b'$') if bytes.get(i + 1) == Some(&b'{') => {
                    frames.push(TemplateFrame::Substitution { braces: 0 });
                    i += 2;
                }
                (TemplateFrame::Text, _) => i += 1,
                (TemplateFrame::Substitution { .. }, b'`') => {
                    frames.push(TemplateFrame::Text);
                    i += 1;
                }
                (TemplateFrame::Substitution { .. }, b'\'' | b'"') => match self.quoted(bytes, i) {
                    Atom::Closed(end) => i = end,
                    Atom::Unterminated => return Atom::Unterminated,
                },
                (TemplateFrame::Substitution { braces }, b'{') => {
                    frames.pop();
                    frames.push(TemplateFrame::Substitution { braces: braces + 1 });
                    i += 1;
                }
                (TemplateFrame::Substitution { braces: 0 }, b'}') => {
                    frames.pop();
                    i += 1;
                }
                (TemplateFrame::Substitution { braces }, b'}') => {
                    frames.pop();
                    frames.push(TemplateFrame::Substitution { braces: braces - 1 });
                    i += 1;
                }
                (TemplateFrame::Substitution { .. }, _) => i += 1,
            }
        }

        Atom::Closed(i)
    }

    fn ends_operand(&self, prev: &str) -> bool {
        match prev.chars().last() {
            Some(')' | ']' | '\'' | '"' | '`') => true,
            Some(ch) if self.is_identifier_continue(ch) => !REGEX_AFTER_WORDS.contains(&prev),
            _ => false,
        }
    }
}

impl HostSyntax for EcmaSyntax {
    fn string_literal(&self, source: &str, pos: usize) -> Option<Atom> {
        let bytes = source.as_bytes();
        match bytes.get(pos)? {
            b'\'' | b'"' => Some(self.quoted(bytes, pos)),
            b'`' => Some(self.template(bytes, pos)),
            _ => None,
        }
    }

    fn block_comment(&self, source: &str, pos: usize) -> Option<Atom> {
        if !source[pos..].starts_with("/*") {
            return None;
        }
        Some(match source[pos + 2..].find("*/") {
            Some(idx) => Atom::Closed(pos + 2 + idx + 2),
            None => Atom::Unterminated,
        })
    }

    fn line_comment(&self, source: &str, pos: usize) -> Option<usize> {
        if !source[pos..].starts_with("//") {
            return None;
        }
        Some(source[pos..].find('\n').map_or(source.len(), |idx| pos + idx))
    }

    fn regex_literal(&self, source: &str, pos: usize, prev: Option<&str>) -> Option<Atom> {
        let bytes = source.as_bytes();
        if bytes.get(pos) != Some(&b'/') || matches!(bytes.get(pos + 1), Some(b'/' | b'*')) {
            return None;
        }
        if prev.is_some_and(|text| self.ends_operand(text)) {
            return None;
        }

        let mut i = pos + 1;
        let mut in_class = false;
        loop {
            match bytes.get(i) {
                None | Some(b'\n') => return Some(Atom::Unterminated),
                Some(b'\\') => i += 2,
                Some(b'[') => {
                    in_class = true;
                    i += 1;
                }
                Some(b']') => {
                    in_class = false;
                    i += 1;
                }
                Some(b'/') if !in_class => break,
                Some(_) => i += 1,
            }
        }
        i += 1;
        while bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic()) {
            i += 1;
        }
        Some(Atom::Closed(i))
    }

    fn is_quote(&self, ch: char) -> bool {
        matches!(ch, '\'' | '"' | '`')
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    fn is_identifier_continue(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }
}
