//! Syntactic skeleton: the declaration sites an annotation can bind to.
//!
//! One forward pass over the host tokens with a frame stack. Annotation
//! tokens are invisible to the pass except when they occupy a name slot in
//! an import/export list. Each anchored token records what it offers to an
//! annotation on its right (`trailing`) and on its left (`leading`).

use crate::lexer::{HostToken, TokenKind, MEMBER_MODIFIERS};
use crate::target::BindingTarget;
use std::collections::HashMap;

/// A declaration site attached to one host token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Declarator { name: String },
    Param { function: String, index: usize, name: String },
    CtorParam { class: String, index: usize, name: String },
    ReturnSlot { function: String },
    Member { class: String, name: String },
    ImportName { module: String, name: String },
    ExportName { name: String },
}

impl Anchor {
    pub fn target(&self) -> BindingTarget {
        match self {
            Anchor::Declarator { name } => BindingTarget::variable(name.clone()),
            Anchor::Param { function, index, .. } => BindingTarget::parameter(function.clone(), *index),
            Anchor::CtorParam { class, index, .. } => {
                BindingTarget::constructor_parameter(class.clone(), *index)
            }
            Anchor::ReturnSlot { function } => BindingTarget::function_return(function.clone()),
            Anchor::Member { class, name } => BindingTarget::class_member(class.clone(), name.clone()),
            Anchor::ImportName { module, name } => BindingTarget::import(module.clone(), name.clone()),
            Anchor::ExportName { name } => BindingTarget::export(name.clone()),
        }
    }
}

/// Import/export clause whose name list an annotation sits in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListClause {
    Import { module: String },
    Export,
}

impl ListClause {
    pub fn target(&self, name: &str) -> BindingTarget {
        match self {
            ListClause::Import { module } => BindingTarget::import(module.clone(), name),
            ListClause::Export => BindingTarget::export(name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    leading: HashMap<usize, Anchor>,
    trailing: HashMap<usize, Anchor>,
    list_slots: HashMap<usize, ListClause>,
}

impl Skeleton {
    pub fn build(tokens: &[HostToken]) -> Self {
        Builder::new(tokens).run()
    }

    /// Anchor an annotation placed right before token `index` binds to.
    pub fn leading(&self, index: usize) -> Option<&Anchor> {
        self.leading.get(&index)
    }

    /// Anchor an annotation placed right after token `index` binds to.
    pub fn trailing(&self, index: usize) -> Option<&Anchor> {
        self.trailing.get(&index)
    }

    /// Clause whose name slot the annotation token at `index` occupies.
    pub fn list_slot(&self, index: usize) -> Option<&ListClause> {
        self.list_slots.get(&index)
    }

    fn both(&mut self, index: usize, anchor: Anchor) {
        self.leading.insert(index, anchor.clone());
        self.trailing.insert(index, anchor);
    }
}

#[derive(Debug, Clone)]
enum Owner {
    Function(String),
    Constructor(String),
}

#[derive(Debug, Clone)]
enum Frame {
    Group,
    Block,
    Class { name: String },
    Params { owner: Owner, index: usize, slot_start: bool },
}

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

struct Builder<'t> {
    tokens: &'t [HostToken],
    // Raw indices of non-annotation tokens
    sig: Vec<usize>,
    // Sig position of each '(' to its matching ')'
    partner: HashMap<usize, usize>,
    frames: Vec<Frame>,
    pending_params: Option<(Owner, usize)>,
    pending_class: Option<(String, usize)>,
    // Name for a function/class expression starting at the given sig position
    binding: Option<(String, usize)>,
    // Frame depth of an open let/const/var statement
    declaration: Option<usize>,
    skeleton: Skeleton,
}

impl<'t> Builder<'t> {
    fn new(tokens: &'t [HostToken]) -> Self {
        let sig: Vec<usize> = (0..tokens.len()).filter(|&i| !tokens[i].is_annotation()).collect();

        let mut partner = HashMap::new();
        let mut open = Vec::new();
        for (p, &raw) in sig.iter().enumerate() {
            if tokens[raw].is_punct("(") {
                open.push(p);
            } else if tokens[raw].is_punct(")") {
                if let Some(o) = open.pop() {
                    partner.insert(o, p);
                }
            }
        }

        Self {
            tokens,
            sig,
            partner,
            frames: Vec::new(),
            pending_params: None,
            pending_class: None,
            binding: None,
            declaration: None,
            skeleton: Skeleton::default(),
        }
    }

    fn run(mut self) -> Skeleton {
        let mut p = 0;
        while p < self.sig.len() {
            p = self.step(p);
        }
        self.skeleton
    }

    fn step(&mut self, p: usize) -> usize {
        self.track_declaration(p);

        if let Some(Frame::Params { .. }) = self.frames.last() {
            if let Some(next) = self.param_step(p) {
                return next;
            }
        }

        if let Some(Frame::Class { name }) = self.frames.last() {
            let class = name.clone();
            if self.at_member_start(p) {
                if let Some(next) = self.member_step(p, &class) {
                    return next;
                }
            }
        }

        let depth = self.frames.len();
        let tok = self.tok(p);
        let text = tok.text.as_str();

        match (tok.kind, text) {
            (TokenKind::Keyword, "let" | "const" | "var") => {
                self.declaration = Some(depth);
                self.declarator(p + 1);
                p + 1
            }
            (TokenKind::Punct, ",") if self.declaration == Some(depth) => {
                self.declarator(p + 1);
                p + 1
            }
            (TokenKind::Punct, "=") => {
                if let Some(prev) = p.checked_sub(1).map(|q| self.tok(q)) {
                    if prev.kind == TokenKind::Ident {
                        self.binding = Some((prev.text.clone(), p + 1));
                    }
                }
                p + 1
            }
            (TokenKind::Ident, "async") => {
                if let Some((name, at)) = self.binding.take() {
                    if at == p {
                        self.binding = Some((name, p + 1));
                    }
                }
                p + 1
            }
            (TokenKind::Keyword, "function") => self.function_head(p),
            (TokenKind::Keyword, "class") if !self.is_property_name(p) => {
                let mut q = p + 1;
                let name = match self.get(q) {
                    Some(t) if t.kind == TokenKind::Ident && t.text != "extends" => {
                        q += 1;
                        t.text.clone()
                    }
                    _ => self.binding_or_anonymous(p),
                };
                self.pending_class = Some((name, depth));
                q
            }
            (TokenKind::Keyword, "import") => self.import_clause(p),
            (TokenKind::Keyword, "export") if self.is_punct_at(p + 1, "{") => self.export_list(p + 1),
            (TokenKind::Keyword, "export")
                if self.get(p + 1).is_some_and(|t| t.text == "type") && self.is_punct_at(p + 2, "{") =>
            {
                self.export_list(p + 2)
            }
            (TokenKind::Ident, _) if self.get(p + 1).is_some_and(|t| t.kind == TokenKind::Arrow) => {
                let function = self.binding_or_anonymous(p);
                let name = tok.text.clone();
                let raw = self.sig[p];
                self.skeleton.leading.insert(raw, Anchor::Param { function: function.clone(), index: 0, name });
                self.skeleton.trailing.insert(raw, Anchor::ReturnSlot { function });
                p + 1
            }
            (TokenKind::Punct, "(") => {
                let frame = match self.pending_params.take() {
                    Some((owner, d)) if d == depth => Frame::Params { owner, index: 0, slot_start: true },
                    _ if self.is_arrow_params(p) => {
                        let owner = Owner::Function(self.binding_or_anonymous(p));
                        Frame::Params { owner, index: 0, slot_start: true }
                    }
                    _ => Frame::Group,
                };
                self.frames.push(frame);
                p + 1
            }
            (TokenKind::Punct, "[") => {
                self.frames.push(Frame::Group);
                p + 1
            }
            (TokenKind::Punct, "{") => {
                let frame = match self.pending_class.take() {
                    Some((name, d)) if d == depth => Frame::Class { name },
                    other => {
                        self.pending_class = other;
                        Frame::Block
                    }
                };
                self.frames.push(frame);
                p + 1
            }
            (TokenKind::Punct, ")" | "]" | "}") => {
                self.frames.pop();
                if self.pending_class.as_ref().is_some_and(|(_, d)| *d > self.frames.len()) {
                    self.pending_class = None;
                }
                p + 1
            }
            _ => p + 1,
        }
    }

    /// Handle tokens directly inside a parameter list. `None` defers to
    /// the generic step.
    fn param_step(&mut self, p: usize) -> Option<usize> {
        let tok = self.tok(p);
        let raw = self.sig[p];
        let next_is_ident = self.get(p + 1).is_some_and(|t| t.kind == TokenKind::Ident);
        let Some(Frame::Params { owner, index, slot_start }) = self.frames.last_mut() else {
            return None;
        };

        if tok.is_punct(",") {
            *index += 1;
            *slot_start = true;
            return Some(p + 1);
        }
        if tok.is_punct(")") {
            let function = match owner {
                Owner::Function(name) => name.clone(),
                Owner::Constructor(class) => format!("{}.constructor", class),
            };
            self.frames.pop();
            self.skeleton.trailing.insert(raw, Anchor::ReturnSlot { function });
            return Some(p + 1);
        }
        if !*slot_start {
            return None;
        }
        if tok.is_punct(".") {
            return Some(p + 1);
        }
        if tok.kind == TokenKind::Ident && PARAM_MODIFIERS.contains(&tok.text.as_str()) && next_is_ident {
            return Some(p + 1);
        }

        *slot_start = false;
        if tok.kind != TokenKind::Ident {
            return None;
        }
        let name = tok.text.clone();
        let anchor = match owner {
            Owner::Function(function) => Anchor::Param { function: function.clone(), index: *index, name },
            Owner::Constructor(class) => Anchor::CtorParam { class: class.clone(), index: *index, name },
        };
        self.skeleton.both(raw, anchor);
        Some(p + 1)
    }

    /// Member head in a class body: modifiers, then a name.
    fn member_step(&mut self, p: usize, class: &str) -> Option<usize> {
        let mut q = p;
        loop {
            let tok = self.get(q)?;
            let is_modifier = tok.kind == TokenKind::Ident && MEMBER_MODIFIERS.contains(&tok.text.as_str());
            if (is_modifier || tok.is_punct("*")) && self.get(q + 1).is_some_and(is_name_token) && !self.line_break_before(q + 1) {
                q += 1;
            } else {
                break;
            }
        }

        let tok = self.get(q)?;
        if !is_name_token(tok) {
            return None;
        }
        let name = match tok.kind {
            TokenKind::String => tok.text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string(),
            _ => tok.text.clone(),
        };
        self.skeleton.both(self.sig[q], Anchor::Member { class: class.to_string(), name: name.clone() });

        let depth = self.frames.len();
        if self.is_punct_at(q + 1, "(") {
            let owner = if name == "constructor" {
                Owner::Constructor(class.to_string())
            } else {
                Owner::Function(format!("{}.{}", class, name))
            };
            self.pending_params = Some((owner, depth));
            return Some(q + 1);
        }
        if self.is_punct_at(q + 1, "=") {
            self.binding = Some((format!("{}.{}", class, name), q + 2));
            return Some(q + 2);
        }
        Some(q + 1)
    }

    fn function_head(&mut self, p: usize) -> usize {
        let mut q = p + 1;
        if self.is_punct_at(q, "*") {
            q += 1;
        }
        let name = match self.get(q) {
            Some(t) if t.kind == TokenKind::Ident => {
                q += 1;
                t.text.clone()
            }
            _ => self.binding_or_anonymous(p),
        };
        self.pending_params = Some((Owner::Function(name), self.frames.len()));
        q
    }

    fn declarator(&mut self, p: usize) {
        if let Some(tok) = self.get(p) {
            if tok.kind == TokenKind::Ident {
                let name = tok.text.clone();
                self.skeleton.both(self.sig[p], Anchor::Declarator { name });
            }
        }
    }

    fn track_declaration(&mut self, p: usize) {
        let Some(d) = self.declaration else { return };
        let depth = self.frames.len();
        if depth < d {
            self.declaration = None;
            return;
        }
        if depth > d {
            return;
        }
        let tok = self.tok(p);
        let continues = p > 0 && matches!(self.tok(p - 1).text.as_str(), "," | "=");
        if tok.is_punct(";") || (self.line_break_before(p) && !continues && !tok.is_punct(",")) {
            self.declaration = None;
        }
    }

    /// `import ... from "module"`: default, namespace and named specifiers.
    fn import_clause(&mut self, p: usize) -> usize {
        let mut q = p + 1;
        let mut names: Vec<(usize, usize, String)> = Vec::new();
        let mut list: Option<(usize, usize)> = None;

        if self.get(q).is_some_and(|t| t.text == "type")
            && self.get(q + 1).is_some_and(|t| t.text != "from" && !t.is_punct(","))
        {
            q += 1;
        }
        if self.get(q).is_some_and(|t| t.kind == TokenKind::String) {
            return q + 1;
        }
        if let Some(t) = self.get(q) {
            if t.kind == TokenKind::Ident && t.text != "from" {
                names.push((q, q, t.text.clone()));
                q += 1;
                if self.is_punct_at(q, ",") {
                    q += 1;
                }
            }
        }
        if self.is_punct_at(q, "*") {
            q += 1;
            if self.get(q).is_some_and(|t| t.text == "as") {
                q += 1;
            }
            if let Some(t) = self.get(q).filter(|t| t.kind == TokenKind::Ident) {
                names.push((q, q, t.text.clone()));
                q += 1;
            }
        }
        if self.is_punct_at(q, "{") {
            let (close, specifiers) = self.name_list(q);
            list = Some((q, close));
            names.extend(specifiers);
            q = close + 1;
        }

        let mut module = String::new();
        if self.get(q).is_some_and(|t| t.text == "from") {
            q += 1;
            if let Some(t) = self.get(q).filter(|t| t.kind == TokenKind::String) {
                module = t.text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string();
                q += 1;
            }
        }

        for (first, last, name) in names {
            let anchor = Anchor::ImportName { module: module.clone(), name };
            self.skeleton.leading.insert(self.sig[first], anchor.clone());
            self.skeleton.trailing.insert(self.sig[last], anchor);
        }
        if let Some((open, close)) = list {
            self.mark_list_slots(open, close, ListClause::Import { module });
        }
        q
    }

    /// `export { a, b as c } [from "module"]`, starting at the `{`.
    fn export_list(&mut self, open: usize) -> usize {
        let (close, names) = self.name_list(open);
        for (first, last, name) in names {
            let anchor = Anchor::ExportName { name };
            self.skeleton.leading.insert(self.sig[first], anchor.clone());
            self.skeleton.trailing.insert(self.sig[last], anchor);
        }
        self.mark_list_slots(open, close, ListClause::Export);

        let mut q = close + 1;
        if self.get(q).is_some_and(|t| t.text == "from") {
            q += 1;
            if self.get(q).is_some_and(|t| t.kind == TokenKind::String) {
                q += 1;
            }
        }
        q
    }

    /// Specifiers between `{` at `open` and its `}`. Empty slots (leading,
    /// trailing or doubled commas) are skipped. Returns the sig position of
    /// the closing brace and `(first, last, name)` per specifier; with `as`
    /// the name is the alias, on both the import and the export side.
    fn name_list(&self, open: usize) -> (usize, Vec<(usize, usize, String)>) {
        let mut names = Vec::new();
        let mut q = open + 1;
        while let Some(tok) = self.get(q) {
            if tok.is_punct("}") {
                return (q, names);
            }
            if tok.is_punct(",") || !is_name_token(tok) {
                q += 1;
                continue;
            }
            if tok.text == "type" && self.get(q + 1).is_some_and(|t| is_name_token(t) && t.text != "as") {
                q += 1;
                continue;
            }
            let original = tok.text.clone();
            if self.get(q + 1).is_some_and(|t| t.text == "as") {
                if let Some(alias) = self.get(q + 2).filter(|t| is_name_token(t)) {
                    names.push((q, q + 2, alias.text.clone()));
                    q += 3;
                    continue;
                }
            }
            names.push((q, q, original));
            q += 1;
        }
        (self.sig.len().saturating_sub(1), names)
    }

    /// Record annotation tokens that occupy a whole name slot of the list.
    fn mark_list_slots(&mut self, open: usize, close: usize, clause: ListClause) {
        let (Some(&open_raw), Some(&close_raw)) = (self.sig.get(open), self.sig.get(close)) else {
            return;
        };
        for raw in open_raw + 1..close_raw {
            if !self.tokens[raw].is_annotation() {
                continue;
            }
            let before = self.tokens[..raw].iter().rev().find(|t| !t.is_annotation());
            let after = self.tokens[raw + 1..].iter().find(|t| !t.is_annotation());
            let opens_slot = before.is_some_and(|t| t.is_punct("{") || t.is_punct(","));
            let closes_slot = after.is_some_and(|t| t.is_punct("}") || t.is_punct(","));
            if opens_slot && closes_slot {
                self.skeleton.list_slots.insert(raw, clause.clone());
            }
        }
    }

    fn at_member_start(&self, p: usize) -> bool {
        if p == 0 || self.line_break_before(p) {
            return true;
        }
        matches!(self.tok(p - 1).text.as_str(), "{" | "}" | ";")
    }

    /// `el.class`, `{ class: 1 }` and `class() {}` use the word as a name.
    fn is_property_name(&self, p: usize) -> bool {
        let after_dot = p.checked_sub(1).is_some_and(|q| self.tok(q).is_punct("."));
        let next = self.get(p + 1);
        after_dot || next.is_some_and(|t| t.is_punct(":") || t.is_punct("(") || t.is_punct("="))
    }

    fn is_arrow_params(&self, p: usize) -> bool {
        self.partner
            .get(&p)
            .and_then(|&close| self.get(close + 1))
            .is_some_and(|t| t.kind == TokenKind::Arrow)
    }

    fn binding_or_anonymous(&mut self, p: usize) -> String {
        match self.binding.take() {
            Some((name, at)) if at == p => name,
            _ => format!("<anonymous@{}>", self.tok(p).span.start),
        }
    }

    /// Any line break between sig position `p - 1` and `p`.
    fn line_break_before(&self, p: usize) -> bool {
        let Some(&raw) = self.sig.get(p) else { return false };
        let from = if p == 0 { 0 } else { self.sig[p - 1] + 1 };
        self.tokens[from..=raw].iter().any(|t| t.newlines_before > 0)
    }

    fn is_punct_at(&self, p: usize, text: &str) -> bool {
        self.get(p).is_some_and(|t| t.is_punct(text))
    }

    fn tok(&self, p: usize) -> &'t HostToken {
        let tokens = self.tokens;
        &tokens[self.sig[p]]
    }

    fn get(&self, p: usize) -> Option<&'t HostToken> {
        let tokens = self.tokens;
        self.sig.get(p).map(|&raw| &tokens[raw])
    }
}

fn is_name_token(tok: &HostToken) -> bool {
    matches!(tok.kind, TokenKind::Ident | TokenKind::Keyword | TokenKind::PrivateName | TokenKind::String | TokenKind::Number)
}
