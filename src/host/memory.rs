//! An in-memory [`HostTree`] for headless use and for the test suite.
//!
//! Nodes live in an arena and are addressed by copyable [`NodeId`] handles. The selector
//! grammar is the subset the widget configuration exercises: a tag name, `.class` markers,
//! `tag.class` combinations and comma-separated alternatives.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::{HostTree, ItemData, Rect};

/// Handle to a node inside a [`MemoryTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Default)]
struct NodeState {
    tag: String,
    classes: BTreeSet<String>,
    data: ItemData,
    style: BTreeMap<String, String>,
    rect: Rect,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Default)]
struct Arena {
    nodes: Vec<NodeState>,
}

/// In-memory host tree. Interior-mutable so that, like the DOM, every operation works
/// through a shared reference.
pub struct MemoryTree {
    arena: RefCell<Arena>,
}

/// One alternative of a parsed selector: an optional tag name plus required classes.
struct Simple {
    tag: Option<String>,
    classes: Vec<String>,
}

fn parse_selector(selector: &str) -> Vec<Simple> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut segments = part.split('.');
            let tag = segments
                .next()
                .filter(|tag| !tag.is_empty())
                .map(str::to_string);
            let classes = segments
                .filter(|class| !class.is_empty())
                .map(str::to_string)
                .collect();

            Simple { tag, classes }
        })
        .collect()
}

impl Arena {
    fn matches(&self, id: usize, selector: &str) -> bool {
        let node = &self.nodes[id];

        parse_selector(selector).iter().any(|simple| {
            simple
                .tag
                .as_ref()
                .map(|tag| *tag == node.tag)
                .unwrap_or(true)
                && simple
                    .classes
                    .iter()
                    .all(|class| node.classes.contains(class))
        })
    }

    /// Depth-first pre-order walk of the descendants of `scope`, excluding `scope` itself.
    fn descendants(&self, scope: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = self.nodes[scope]
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }

        out
    }

    /// Unlink `id` from its parent, leaving it detached.
    fn detach(&mut self, id: usize) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|child| *child != id);
        }
    }

    fn clone_subtree(&mut self, id: usize) -> usize {
        let copy = NodeState {
            tag: self.nodes[id].tag.clone(),
            classes: self.nodes[id].classes.clone(),
            data: self.nodes[id].data.clone(),
            style: self.nodes[id].style.clone(),
            rect: self.nodes[id].rect,
            parent: None,
            children: Vec::new(),
        };
        let copy_id = self.nodes.len();
        self.nodes.push(copy);

        for child in self.nodes[id].children.clone() {
            let child_copy = self.clone_subtree(child);
            self.nodes[child_copy].parent = Some(copy_id);
            self.nodes[copy_id].children.push(child_copy);
        }

        copy_id
    }
}

impl MemoryTree {
    /// Create a tree holding only the document root (a `body` element).
    pub fn new() -> Self {
        let tree = Self {
            arena: RefCell::new(Arena::default()),
        };
        tree.arena.borrow_mut().nodes.push(NodeState {
            tag: "body".into(),
            ..NodeState::default()
        });

        tree
    }

    /// Create a detached element with the given tag and classes.
    pub fn node(&self, tag: &str, classes: &[&str]) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let id = arena.nodes.len();
        arena.nodes.push(NodeState {
            tag: tag.into(),
            classes: classes.iter().map(|class| class.to_string()).collect(),
            ..NodeState::default()
        });

        NodeId(id)
    }

    /// Assign the bounding box reported for a node.
    pub fn set_rect(&self, node: &NodeId, rect: Rect) {
        self.arena.borrow_mut().nodes[node.0].rect = rect;
    }

    pub fn tag(&self, node: &NodeId) -> String {
        self.arena.borrow().nodes[node.0].tag.clone()
    }

    pub fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.arena.borrow().nodes[node.0].classes.contains(class)
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, node: &NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut current = node.0;
        loop {
            if current == 0 {
                return true;
            }
            match arena.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for MemoryTree {
    type Node = NodeId;

    fn query(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        arena
            .descendants(scope.0)
            .into_iter()
            .find(|id| arena.matches(*id, selector))
            .map(NodeId)
    }

    fn query_all(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        arena
            .descendants(scope.0)
            .into_iter()
            .filter(|id| arena.matches(*id, selector))
            .map(NodeId)
            .collect()
    }

    fn matches(&self, node: &NodeId, selector: &str) -> bool {
        self.arena.borrow().matches(node.0, selector)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let mut current = Some(node.0);
        while let Some(id) = current {
            if arena.matches(id, selector) {
                return Some(NodeId(id));
            }
            current = arena.nodes[id].parent;
        }

        None
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.arena.borrow().nodes[node.0].parent.map(NodeId)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.arena.borrow().nodes[node.0]
            .children
            .iter()
            .copied()
            .map(NodeId)
            .collect()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let parent = arena.nodes[node.0].parent?;
        let siblings = &arena.nodes[parent].children;
        let position = siblings.iter().position(|id| *id == node.0)?;

        siblings.get(position + 1).copied().map(NodeId)
    }

    fn prev_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let parent = arena.nodes[node.0].parent?;
        let siblings = &arena.nodes[parent].children;
        let position = siblings.iter().position(|id| *id == node.0)?;

        position.checked_sub(1).map(|prev| NodeId(siblings[prev]))
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut current = Some(node.0);
        while let Some(id) = current {
            if id == ancestor.0 {
                return true;
            }
            current = arena.nodes[id].parent;
        }

        false
    }

    fn create(&self, tag: &str) -> NodeId {
        self.node(tag, &[])
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, anchor: Option<&NodeId>) {
        // Inserting a node before itself keeps its position (the DOM resolves the anchor to
        // the node's next sibling after detaching it).
        if anchor == Some(node) {
            return;
        }

        let mut arena = self.arena.borrow_mut();
        arena.detach(node.0);

        let children = &mut arena.nodes[parent.0].children;
        let position = anchor
            .and_then(|anchor| children.iter().position(|id| *id == anchor.0))
            .unwrap_or(children.len());
        children.insert(position, node.0);
        arena.nodes[node.0].parent = Some(parent.0);
    }

    fn remove(&self, node: &NodeId) {
        self.arena.borrow_mut().detach(node.0);
    }

    fn clone_node(&self, node: &NodeId) -> NodeId {
        NodeId(self.arena.borrow_mut().clone_subtree(node.0))
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.arena.borrow_mut().nodes[node.0]
            .classes
            .insert(class.into());
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.arena.borrow_mut().nodes[node.0].classes.remove(class);
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut arena = self.arena.borrow_mut();
        if value.is_empty() {
            arena.nodes[node.0].style.remove(property);
        } else {
            arena.nodes[node.0]
                .style
                .insert(property.into(), value.into());
        }
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.arena.borrow().nodes[node.0].style.get(property).cloned()
    }

    fn data(&self, node: &NodeId) -> ItemData {
        self.arena.borrow().nodes[node.0].data.clone()
    }

    fn set_data(&self, node: &NodeId, key: &str, value: &str) {
        self.arena.borrow_mut().nodes[node.0]
            .data
            .insert(key.into(), value.into());
    }

    fn rect(&self, node: &NodeId) -> Rect {
        self.arena.borrow().nodes[node.0].rect
    }

    fn document_root(&self) -> NodeId {
        NodeId(0)
    }
}
