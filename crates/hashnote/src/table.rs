use crate::node::AnnotationNode;
use crate::target::BindingTarget;
use indexmap::IndexMap;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::fmt;

/// Which attachment rule bound an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachRule {
    /// Alone between blank lines
    Isolated,
    /// Bound to the construct right before it on the same line
    Trailing,
    /// Bound to the construct it precedes
    Leading,
    /// Occupies a name slot of an import/export list
    ListSlot,
    /// Nothing to bind to
    Fallback,
}

impl fmt::Display for AttachRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttachRule::Isolated => "isolated",
            AttachRule::Trailing => "trailing",
            AttachRule::Leading => "leading",
            AttachRule::ListSlot => "list-slot",
            AttachRule::Fallback => "fallback",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub node: AnnotationNode,
    pub rule: AttachRule,
}

/// Binding targets in first-attachment order, each with its annotations in
/// source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    entries: IndexMap<BindingTarget, Vec<Attachment>>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, target: BindingTarget, attachment: Attachment) {
        self.entries.entry(target).or_default().push(attachment);
    }

    pub fn get(&self, target: &BindingTarget) -> Option<&[Attachment]> {
        self.entries.get(target).map(Vec::as_slice)
    }

    /// Payload texts bound to `target`, in source order.
    pub fn payloads(&self, target: &BindingTarget) -> Vec<&str> {
        self.get(target).map_or_else(Vec::new, |list| list.iter().map(|a| a.node.payload.as_str()).collect())
    }

    /// The target an annotation starting at `offset` was bound to.
    pub fn target_of(&self, offset: usize) -> Option<&BindingTarget> {
        self.entries
            .iter()
            .find(|(_, list)| list.iter().any(|a| a.node.span.start == offset))
            .map(|(target, _)| target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindingTarget, &[Attachment])> {
        self.entries.iter().map(|(target, list)| (target, list.as_slice()))
    }

    pub fn targets(&self) -> impl Iterator<Item = &BindingTarget> {
        self.entries.keys()
    }

    /// Number of distinct targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attached annotations across all targets.
    pub fn node_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

// Targets are structured values, so the table goes out as a list of
// `{ target, annotations }` records instead of a map.
impl Serialize for AnnotationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            target: &'a BindingTarget,
            annotations: &'a [Attachment],
        }

        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (target, list) in &self.entries {
            seq.serialize_element(&Entry { target, annotations: list })?;
        }
        seq.end()
    }
}
