//! Lifecycle events and their dispatch.
//!
//! Subscriptions are registered per instance under a typed [`EventKind`]; each kind carries an
//! explicit [`DispatchPolicy`]. Context-scoped kinds walk the registered instances and deliver
//! only to the first one whose root contains the event's subject item; the cross-instance
//! transfer kinds are delivered directly by the instance whose boundary was crossed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::Context;
use crate::host::HostTree;
use crate::list::NestedList;

/// A lifecycle transition observable by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An item was picked up.
    Start,
    /// The active item is about to be relocated.
    BeforeMove,
    /// The active item was relocated and the source list cleaned up.
    AfterMove,
    /// The active item moved one level deeper (a right move).
    Nest,
    /// The active item moved one level shallower (a left move).
    Unnest,
    /// The gesture ended.
    Release,
    /// The active item left this instance's root.
    MoveOut,
    /// The active item entered this instance's root.
    MoveIn,
    /// An item's sub-list children were promoted to its siblings.
    Extract,
}

/// How an [`EventKind`] is routed to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Walk the context's instances; the first whose root contains the subject item receives
    /// the event, and the walk stops there even if it has no subscribers for the kind.
    FirstContaining,
    /// Delivered by the instance that observed the transition, outside the context walk.
    Direct,
}

impl EventKind {
    /// The event name exposed to embedders (log output, JS-facing layers).
    pub fn name(&self) -> &'static str {
        use EventKind::*;
        match self {
            Start => "start",
            BeforeMove => "beforemove",
            AfterMove => "aftermove",
            Nest => "nest",
            Unnest => "unnest",
            Release => "release",
            MoveOut => "moveout",
            MoveIn => "movein",
            Extract => "extract",
        }
    }

    pub fn policy(&self) -> DispatchPolicy {
        use EventKind::*;
        match self {
            MoveOut | MoveIn => DispatchPolicy::Direct,
            _ => DispatchPolicy::FirstContaining,
        }
    }

    /// The kinds bundled by a `change` subscription: everything after which the hierarchy may
    /// differ from the last read.
    pub const CHANGE: [EventKind; 4] = [
        EventKind::Release,
        EventKind::MoveOut,
        EventKind::Extract,
        EventKind::MoveIn,
    ];
}

/// Payload passed to event callbacks: the subject item plus, where a mutation triggered the
/// event, the source and destination nodes recorded before/after it.
#[derive(Clone, Debug)]
pub struct ListEvent<H: HostTree> {
    pub item: H::Node,
    pub from: Option<H::Node>,
    pub to: Option<H::Node>,
}

/// Subscriber callback. Receives the instance the event was delivered to and the payload.
pub type EventCallback<H> = dyn Fn(&NestedList<H>, &ListEvent<H>);

/// Deliver a [`DispatchPolicy::FirstContaining`] event for `item`.
///
/// All interior borrows are released before any callback runs, so callbacks are free to
/// serialize or subscribe re-entrantly.
pub(crate) fn dispatch<H: HostTree>(
    host: &H,
    context: &Rc<RefCell<Context<H>>>,
    kind: EventKind,
    item: &H::Node,
) {
    debug_assert_eq!(kind.policy(), DispatchPolicy::FirstContaining);

    let (instances, from, to) = {
        let mut context = context.borrow_mut();
        (
            context.live_instances(),
            context.from.clone(),
            context.to.clone(),
        )
    };

    for instance in instances {
        if !host.contains(instance.root(), item) {
            continue;
        }

        let event = ListEvent {
            item: item.clone(),
            from: from.clone(),
            to: to.clone(),
        };
        for callback in instance.callbacks(kind) {
            callback(&instance, &event);
        }

        // First containing instance wins, subscribers or not.
        return;
    }

    tracing::debug!(event = kind.name(), "no registered root contains the item");
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::context::{ContextId, ContextManager};
    use crate::host::memory::MemoryTree;
    use crate::Options;

    fn listed_root(tree: &Rc<MemoryTree>) -> <MemoryTree as HostTree>::Node {
        let root = tree.node("ul", &["nl-list"]);
        tree.append(&tree.document_root(), &root);
        root
    }

    #[test]
    fn names_and_policies() {
        assert_eq!(EventKind::Nest.name(), "nest");
        assert_eq!(EventKind::Unnest.name(), "unnest");
        assert_eq!(EventKind::MoveIn.policy(), DispatchPolicy::Direct);
        assert_eq!(EventKind::MoveOut.policy(), DispatchPolicy::Direct);
        assert_eq!(EventKind::Release.policy(), DispatchPolicy::FirstContaining);
        assert_eq!(EventKind::Extract.policy(), DispatchPolicy::FirstContaining);
    }

    #[test]
    fn first_containing_instance_wins() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let root_a = listed_root(&tree);
        let root_b = listed_root(&tree);
        let item = tree.node("li", &[]);
        tree.append(&root_b, &item);

        let a = NestedList::attach(
            Rc::clone(&tree),
            root_a,
            Options::default(),
            &mut manager,
        )
        .unwrap();
        let b = NestedList::attach(
            Rc::clone(&tree),
            root_b,
            Options::default(),
            &mut manager,
        )
        .unwrap();

        let hits = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&hits);
        a.on(EventKind::Release, move |_, _| log.borrow_mut().push("a"));
        let log = Rc::clone(&hits);
        b.on(EventKind::Release, move |_, _| log.borrow_mut().push("b"));

        let context = manager.get_or_create(ContextId::default());
        dispatch(&*tree, &context, EventKind::Release, &item);

        assert_eq!(*hits.borrow(), vec!["b"]);
    }

    #[test]
    fn walk_stops_at_a_containing_instance_without_subscribers() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        // Nested roots: the outer instance registers first and contains everything the inner
        // root contains, so it shadows the inner instance for context-scoped dispatch.
        let outer = listed_root(&tree);
        let holder = tree.node("li", &[]);
        let inner = tree.node("ul", &["nl-list"]);
        tree.append(&outer, &holder);
        tree.append(&holder, &inner);
        let item = tree.node("li", &[]);
        tree.append(&inner, &item);

        let _outer_list = NestedList::attach(
            Rc::clone(&tree),
            outer,
            Options::default(),
            &mut manager,
        )
        .unwrap();
        let inner_list = NestedList::attach(
            Rc::clone(&tree),
            inner,
            Options::default(),
            &mut manager,
        )
        .unwrap();

        let hits = Rc::new(RefCell::new(0));
        let count = Rc::clone(&hits);
        inner_list.on(EventKind::Release, move |_, _| *count.borrow_mut() += 1);

        let context = manager.get_or_create(ContextId::default());
        dispatch(&*tree, &context, EventKind::Release, &item);

        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn callbacks_receive_the_recorded_from_and_to() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let root = listed_root(&tree);
        let item = tree.node("li", &[]);
        tree.append(&root, &item);

        let list = NestedList::attach(
            Rc::clone(&tree),
            root,
            Options::default(),
            &mut manager,
        )
        .unwrap();

        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        list.on(EventKind::AfterMove, move |_, event| {
            *slot.borrow_mut() = Some((event.from, event.to));
        });

        let context = manager.get_or_create(ContextId::default());
        {
            let mut context = context.borrow_mut();
            context.from = Some(root);
            context.to = Some(root);
        }
        dispatch(&*tree, &context, EventKind::AfterMove, &item);

        assert_eq!(*seen.borrow(), Some((Some(root), Some(root))));
    }
}
