//! Read-only export of the hierarchy as data.
//!
//! Two walks over the same structure: a flat, parent-indexed array and a nested tree. Neither
//! touches the host tree; item data is snapshotted into the records.

use crate::error::Error;
use crate::host::{HostTree, ItemData};

/// One entry of the flat export: the item's data plus the index of its parent record in the
/// same array, `-1` for top-level items. Records appear in document (depth-first, pre-order)
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatRecord {
    pub data: ItemData,
    pub parent: isize,
}

/// One entry of the nested export: the item's data plus its children, recursively.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeRecord {
    pub data: ItemData,
    pub children: Vec<TreeRecord>,
}

/// `root` itself when it is a List, otherwise its first descendant List.
fn resolve_list<H: HostTree>(
    host: &H,
    root: &H::Node,
    list_selector: &str,
) -> Result<H::Node, Error> {
    if host.matches(root, list_selector) {
        return Ok(root.clone());
    }

    host.query(root, list_selector).ok_or(Error::NoList)
}

fn direct_sublist<H: HostTree>(host: &H, item: &H::Node, list_selector: &str) -> Option<H::Node> {
    host.children(item)
        .into_iter()
        .find(|child| host.matches(child, list_selector))
}

/// Export the hierarchy under `root` as a flat, parent-indexed array.
///
/// Fails with [`Error::NoList`] when `root` is not a List and no descendant List exists.
pub fn serialize_flat<H: HostTree>(
    host: &H,
    root: &H::Node,
    list_selector: &str,
) -> Result<Vec<FlatRecord>, Error> {
    let list = resolve_list(host, root, list_selector)?;

    let mut records = Vec::new();
    flat_walk(host, &list, -1, list_selector, &mut records);

    Ok(records)
}

fn flat_walk<H: HostTree>(
    host: &H,
    list: &H::Node,
    parent: isize,
    list_selector: &str,
    records: &mut Vec<FlatRecord>,
) {
    for child in host.children(list) {
        records.push(FlatRecord {
            data: host.data(&child),
            parent,
        });
        let index = records.len() as isize - 1;

        if let Some(inner) = direct_sublist(host, &child, list_selector) {
            flat_walk(host, &inner, index, list_selector, records);
        }
    }
}

/// Export the hierarchy under `root` as nested records.
///
/// Fails with [`Error::NoList`] when `root` is not a List and no descendant List exists.
pub fn serialize_tree<H: HostTree>(
    host: &H,
    root: &H::Node,
    list_selector: &str,
) -> Result<Vec<TreeRecord>, Error> {
    let list = resolve_list(host, root, list_selector)?;

    let mut records = Vec::new();
    tree_walk(host, &list, list_selector, &mut records);

    Ok(records)
}

fn tree_walk<H: HostTree>(
    host: &H,
    list: &H::Node,
    list_selector: &str,
    records: &mut Vec<TreeRecord>,
) {
    for child in host.children(list) {
        // Children are built before their parent record is appended; document order is
        // preserved because each child's subtree completes before the next sibling starts.
        let mut children = Vec::new();
        if let Some(inner) = direct_sublist(host, &child, list_selector) {
            tree_walk(host, &inner, list_selector, &mut children);
        }

        records.push(TreeRecord {
            data: host.data(&child),
            children,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::memory::{MemoryTree, NodeId};

    fn data_item(tree: &MemoryTree, index: &str) -> NodeId {
        let item = tree.node("li", &[]);
        tree.set_data(&item, "index", index);
        item
    }

    /// body > div > ul [ 1, 2 [ 3, 4 [ 5 ] ], 6 ]
    fn sample() -> (Rc<MemoryTree>, NodeId, NodeId) {
        let tree = Rc::new(MemoryTree::new());
        let wrapper = tree.node("div", &[]);
        let list = tree.node("ul", &["nl-list"]);
        tree.append(&tree.document_root(), &wrapper);
        tree.append(&wrapper, &list);

        let i1 = data_item(&tree, "1");
        let i2 = data_item(&tree, "2");
        let i3 = data_item(&tree, "3");
        let i4 = data_item(&tree, "4");
        let i5 = data_item(&tree, "5");
        let i6 = data_item(&tree, "6");

        tree.append(&list, &i1);
        tree.append(&list, &i2);
        tree.append(&list, &i6);

        let sub = tree.node("ul", &["nl-list"]);
        tree.append(&i2, &sub);
        tree.append(&sub, &i3);
        tree.append(&sub, &i4);

        let subsub = tree.node("ul", &["nl-list"]);
        tree.append(&i4, &subsub);
        tree.append(&subsub, &i5);

        (tree, wrapper, list)
    }

    fn indices(records: &[FlatRecord]) -> Vec<(String, isize)> {
        records
            .iter()
            .map(|record| (record.data["index"].clone(), record.parent))
            .collect()
    }

    #[test]
    fn flat_is_preorder_with_parent_indices() {
        let (tree, _, list) = sample();

        let records = serialize_flat(&*tree, &list, "ul").unwrap();
        assert_eq!(
            indices(&records),
            vec![
                ("1".into(), -1),
                ("2".into(), -1),
                ("3".into(), 1),
                ("4".into(), 1),
                ("5".into(), 3),
                ("6".into(), -1),
            ]
        );
    }

    #[test]
    fn tree_nests_in_document_order() {
        let (tree, _, list) = sample();

        let records = serialize_tree(&*tree, &list, "ul").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].data["index"], "1");
        assert!(records[0].children.is_empty());
        assert_eq!(records[1].data["index"], "2");
        assert_eq!(records[1].children.len(), 2);
        assert_eq!(records[1].children[0].data["index"], "3");
        assert_eq!(records[1].children[1].data["index"], "4");
        assert_eq!(records[1].children[1].children[0].data["index"], "5");
        assert_eq!(records[2].data["index"], "6");
    }

    #[test]
    fn a_non_list_root_falls_back_to_its_first_descendant_list() {
        let (tree, wrapper, list) = sample();

        assert_eq!(
            serialize_flat(&*tree, &wrapper, "ul").unwrap(),
            serialize_flat(&*tree, &list, "ul").unwrap()
        );
    }

    #[test]
    fn serializing_without_any_list_raises() {
        let tree = MemoryTree::new();
        let lonely = tree.node("div", &[]);
        tree.append(&tree.document_root(), &lonely);

        assert_eq!(
            serialize_flat(&tree, &lonely, "ul").err(),
            Some(Error::NoList)
        );
        assert_eq!(
            serialize_tree(&tree, &lonely, "ul").err(),
            Some(Error::NoList)
        );
    }

    #[test]
    fn serialization_does_not_mutate_the_tree() {
        let (tree, _, list) = sample();

        let before = tree.children(&list);
        serialize_flat(&*tree, &list, "ul").unwrap();
        serialize_tree(&*tree, &list, "ul").unwrap();
        assert_eq!(tree.children(&list), before);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn records_serialize_to_the_documented_shape() {
        let (tree, _, list) = sample();

        let records = serialize_flat(&*tree, &list, "ul").unwrap();
        let json = serde_json::to_value(&records[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "data": { "index": "3" }, "parent": 1 })
        );
    }
}
