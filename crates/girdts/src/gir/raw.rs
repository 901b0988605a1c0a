//! Raw GIR element tree
//!
//! Mirrors the XML document one-to-one: every element keeps its attributes
//! and its children grouped by (prefixed) tag name in document order.

use indexmap::IndexMap;

/// Stable identity of a GIR element, assigned once at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Allocator for [`NodeId`]s
///
/// One generator is shared by every document parsed during a run so that ids
/// stay unique across modules.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next);
        self.next += 1;
        id
    }
}

/// One GIR element
#[derive(Debug, Clone)]
pub struct RawNode {
    pub id: NodeId,
    /// Tag name including its namespace prefix, e.g. `glib:signal`
    pub tag: String,
    /// Attributes keyed by prefixed name, e.g. `c:type`
    pub attrs: IndexMap<String, String>,
    /// Child elements grouped by tag, each group in document order
    pub children: IndexMap<String, Vec<RawNode>>,
}

impl RawNode {
    pub fn new(id: NodeId, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Boolean attribute with GIR semantics, see [`gir_bool`]
    pub fn bool_attr(&self, name: &str, default: bool) -> bool {
        gir_bool(self.attr(name), default)
    }

    /// Non-negative integer attribute (array lengths, closure indices)
    pub fn index_attr(&self, name: &str) -> Option<usize> {
        self.attr(name).and_then(|value| value.trim().parse().ok())
    }

    pub fn children(&self, tag: &str) -> &[RawNode] {
        self.children.get(tag).map_or(&[], Vec::as_slice)
    }

    pub fn first(&self, tag: &str) -> Option<&RawNode> {
        self.children(tag).first()
    }

    pub fn push_child(&mut self, child: RawNode) {
        self.children.entry(child.tag.clone()).or_default().push(child);
    }
}

/// GIR boolean: only an integer `0` is false, any other present value is true
pub fn gir_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(value) if !value.is_empty() => value.trim().parse::<i64>() != Ok(0),
        _ => default,
    }
}
