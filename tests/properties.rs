//! Property-style checks over generated gesture sequences.

mod common;

use common::{flat_list, item, Fixture};
use nested_list::{FlatRecord, HostTree, PointerInput, TreeRecord};
use proptest::prelude::*;

const ITEMS: usize = 6;

#[derive(Clone, Copy, Debug)]
enum Op {
    Nest(usize),
    Unnest(usize),
    Reorder(usize, usize),
    Extract(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (0..4u8, 0..ITEMS, 0..ITEMS).prop_map(|(kind, a, b)| match kind {
        0 => Op::Nest(a),
        1 => Op::Unnest(a),
        2 => Op::Reorder(a, b),
        _ => Op::Extract(a),
    })
}

/// Drive the state machine through one complete gesture. Successive `now` values must be
/// spaced past the settle window for the op to get its structural decision.
fn apply_op(f: &Fixture, op: Op, now: f64) {
    match op {
        Op::Nest(i) => {
            if f.list.begin_drag(&f.items[i], PointerInput::mouse(100.0, 10.0)) {
                f.list.drag_to(200.0, 10.0, now);
                f.list.end_drag();
            }
        }
        Op::Unnest(i) => {
            if f.list.begin_drag(&f.items[i], PointerInput::mouse(100.0, 10.0)) {
                f.list.drag_to(0.0, 10.0, now);
                f.list.end_drag();
            }
        }
        Op::Reorder(i, j) => {
            if f.list.begin_drag(&f.items[i], PointerInput::mouse(100.0, 10.0)) {
                f.list.enter_item(&f.items[j]);
                f.list.drag_to(100.0, 100.0, now);
                f.list.end_drag();
            }
        }
        Op::Extract(i) => f.list.extract(&f.items[i]),
    }
}

fn assert_no_empty_lists(f: &Fixture) {
    for list in f.tree.query_all(&f.tree.document_root(), "ul") {
        assert!(
            !f.tree.children(&list).is_empty(),
            "found an orphaned empty list"
        );
    }
}

fn flatten(records: &[TreeRecord], parent: isize, out: &mut Vec<FlatRecord>) {
    for record in records {
        out.push(FlatRecord {
            data: record.data.clone(),
            parent,
        });
        let index = out.len() as isize - 1;
        flatten(&record.children, index, out);
    }
}

proptest! {
    /// Lateral travel at or under the threshold never nests or un-nests.
    #[test]
    fn travel_within_the_threshold_is_inert(dx in 0.0..=20.0f64, toward_right in any::<bool>()) {
        let f = flat_list(3);
        prop_assert!(f.list.begin_drag(&f.items[2], PointerInput::mouse(100.0, 75.0)));

        let x = if toward_right { 100.0 + dx } else { 100.0 - dx };
        f.list.drag_to(x, 75.0, 1_000.0);

        prop_assert_eq!(f.tree.children(&f.root), f.items.clone());
        f.list.end_drag();
    }

    /// No sequence of gestures leaves a zero-child List anywhere in the tree.
    #[test]
    fn no_gesture_sequence_orphans_an_empty_list(
        ops in proptest::collection::vec(op_strategy(), 1..30),
    ) {
        let f = flat_list(ITEMS);
        for (step, op) in ops.into_iter().enumerate() {
            apply_op(&f, op, 1_000.0 * (step as f64 + 1.0));
            assert_no_empty_lists(&f);
        }
    }

    /// Flattening the nested export with running parent indices reproduces the flat export,
    /// whatever shape the gestures produced.
    #[test]
    fn tree_flattening_matches_the_flat_export(
        ops in proptest::collection::vec(op_strategy(), 0..25),
    ) {
        let f = flat_list(ITEMS);
        for (step, op) in ops.into_iter().enumerate() {
            apply_op(&f, op, 1_000.0 * (step as f64 + 1.0));
        }

        let flat = f.list.serialize().unwrap();
        let tree = f.list.serialize_tree().unwrap();
        let mut flattened = Vec::new();
        flatten(&tree, -1, &mut flattened);

        prop_assert_eq!(flattened, flat);
    }

    /// Hovering the active item's own descendants, at any depth, never yields a drop target.
    #[test]
    fn descendants_are_never_drop_targets(depth in 1usize..6) {
        let f = flat_list(2);

        let mut parent = f.items[0];
        for level in 0..depth {
            let sublist = f.tree.node("ul", &["nl-list"]);
            let child = item(&f.tree, &format!("d{level}"));
            f.tree.append(&parent, &sublist);
            f.tree.append(&sublist, &child);
            parent = child;
        }
        let before = f.list.serialize().unwrap();

        prop_assert!(f.list.begin_drag(&f.items[0], PointerInput::mouse(50.0, 5.0)));
        f.list.enter_item(&parent);
        // A downward sweep that would reorder against any accepted hover target.
        f.list.drag_to(50.0, 500.0, 1_000.0);
        f.list.end_drag();

        prop_assert_eq!(f.list.serialize().unwrap(), before);
    }
}
