//! The capability set the core consumes from its host document.
//!
//! The drag machine, tree mutator and serializers never touch a rendering surface directly;
//! they go through [`HostTree`]. [`memory::MemoryTree`] implements the same capabilities over
//! an in-memory arena, which is what the test suite (and any headless embedding) runs against.

pub mod memory;

use std::collections::BTreeMap;
use std::fmt::Debug;

/// The key/value payload a host node carries (`data-*` attributes in the DOM). Serialization
/// snapshots this map into the emitted records.
pub type ItemData = BTreeMap<String, String>;

/// Axis-aligned bounding box of a node, in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge of the box.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge of the box.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Everything the core needs from a document tree.
///
/// Handles ([`HostTree::Node`]) are cheap identifiers into the host tree; they never own the
/// node, and resolving one that was externally removed must not panic. Selector strings are
/// interpreted by the host; implementations only need the subset the widget configuration
/// uses (tag names, class selectors and comma-separated alternatives).
pub trait HostTree {
    type Node: Clone + PartialEq + Debug;

    /// First descendant of `scope` (excluding `scope` itself) matching `selector`, in
    /// document order.
    fn query(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// All descendants of `scope` (excluding `scope` itself) matching `selector`, in
    /// document order.
    fn query_all(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: &Self::Node, selector: &str) -> bool;

    /// Closest of `node` and its ancestors matching `selector`, `node` itself included.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Direct element children, in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn prev_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// DOM containment semantics: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Create a new detached element of the given tag.
    fn create(&self, tag: &str) -> Self::Node;

    /// Move `node` into `parent`, immediately before `anchor`, or appended when no anchor is
    /// given. Detaches `node` from its previous parent first.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>);

    /// Append `node` as the last child of `parent`.
    fn append(&self, parent: &Self::Node, node: &Self::Node) {
        self.insert_before(parent, node, None);
    }

    /// Detach `node` (and its subtree) from the tree.
    fn remove(&self, node: &Self::Node);

    /// Deep-clone `node`; the clone starts out detached.
    fn clone_node(&self, node: &Self::Node) -> Self::Node;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Write one inline style property. An empty value clears the property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Read the effective value of a style property, if any.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Snapshot of the node's data map.
    fn data(&self, node: &Self::Node) -> ItemData;

    fn set_data(&self, node: &Self::Node, key: &str, value: &str);

    /// Bounding box in viewport coordinates.
    fn rect(&self, node: &Self::Node) -> Rect;

    /// The node dragged ghosts are appended to (`document.body` in the DOM).
    fn document_root(&self) -> Self::Node;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.bottom(), 50.0);
    }
}
