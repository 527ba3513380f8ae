//! Shared fixture: a widget over an in-memory host tree, items stacked vertically the way a
//! rendered list would be.
#![allow(dead_code)] // each test binary uses a different subset of the helpers

use std::rc::Rc;

use nested_list::host::memory::{MemoryTree, NodeId};
use nested_list::{ContextManager, FlatRecord, HostTree, NestedList, Options, Rect};

pub const ITEM_HEIGHT: f64 = 30.0;

pub struct Fixture {
    pub tree: Rc<MemoryTree>,
    pub manager: ContextManager<MemoryTree>,
    pub list: Rc<NestedList<MemoryTree>>,
    pub root: NodeId,
    pub items: Vec<NodeId>,
}

/// A draggable item: `li > span.nl-handle`, carrying its index in the data map.
pub fn item(tree: &MemoryTree, index: &str) -> NodeId {
    let item = tree.node("li", &[]);
    let handle = tree.node("span", &["nl-handle"]);
    tree.append(&item, &handle);
    tree.set_data(&item, "index", index);
    item
}

/// A flat `ul` of `count` items bound to a fresh instance, each item given a stacked
/// bounding box.
pub fn flat_list(count: usize) -> Fixture {
    let tree = Rc::new(MemoryTree::new());
    let root = tree.node("ul", &["nl-list"]);
    tree.append(&tree.document_root(), &root);

    let items = (0..count)
        .map(|index| {
            let node = item(&tree, &(index + 1).to_string());
            tree.set_rect(
                &node,
                Rect::new(0.0, index as f64 * ITEM_HEIGHT, 200.0, ITEM_HEIGHT),
            );
            tree.append(&root, &node);
            node
        })
        .collect();

    let mut manager = ContextManager::new();
    let list =
        NestedList::attach(Rc::clone(&tree), root, Options::default(), &mut manager).unwrap();

    Fixture {
        tree,
        manager,
        list,
        root,
        items,
    }
}

/// Collapse flat records into `(index, parent)` pairs for terse assertions.
pub fn indices(records: &[FlatRecord]) -> Vec<(String, isize)> {
    records
        .iter()
        .map(|record| (record.data["index"].clone(), record.parent))
        .collect()
}
