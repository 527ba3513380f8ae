//! Shared state for one logical drag region.
//!
//! Instances constructed with the same [`ContextId`] share a [`Context`], which is what lets a
//! gesture pick an item up in one widget and drop it in another. The registry is an explicit,
//! caller-owned [`ContextManager`] rather than a process-wide cache, so embedders control its
//! lifetime and can tear contexts down with [`ContextManager::dispose`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::host::HostTree;
use crate::list::NestedList;

/// Identifies a drag region. Instances supplying equal ids share one [`Context`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextId {
    Number(i64),
    Text(String),
}

impl Default for ContextId {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<i64> for ContextId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self::Text(id.into())
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Shared mutable state for one drag region: the in-flight gesture plus the instances
/// registered under the region's id.
///
/// Item references are weak by construction; the host tree owns the nodes, the context only
/// holds handles resolved on demand. The ghost is the exception: the context owns it from
/// pick-up until release.
pub struct Context<H: HostTree> {
    /// Detached visual clone following the pointer.
    pub(crate) ghost: Option<H::Node>,
    /// The item being moved.
    pub(crate) active: Option<H::Node>,
    /// The item currently under the pointer.
    pub(crate) over: Option<H::Node>,
    /// Source node of the in-flight mutation, for event payloads.
    pub(crate) from: Option<H::Node>,
    /// Destination node of the in-flight mutation, for event payloads.
    pub(crate) to: Option<H::Node>,
    pub(crate) last_mouse_y: f64,
    /// Pointer X at the last nest/un-nest step.
    pub(crate) last_step_x: f64,
    /// Timestamp (ms) of the last structural decision, for the settle gate.
    pub(crate) last_move: f64,
    /// The instance whose root the pointer most recently left mid-drag.
    pub(crate) moved_from: Option<Weak<NestedList<H>>>,
    instances: Vec<Weak<NestedList<H>>>,
}

impl<H: HostTree> Context<H> {
    fn new() -> Self {
        Self {
            ghost: None,
            active: None,
            over: None,
            from: None,
            to: None,
            last_mouse_y: 0.0,
            last_step_x: 0.0,
            last_move: 0.0,
            moved_from: None,
            instances: Vec::new(),
        }
    }

    /// Register an instance under this context. Registering the same instance twice is a
    /// no-op; dispatch walks each instance once.
    pub(crate) fn register(&mut self, instance: &Rc<NestedList<H>>) {
        let handle = Rc::downgrade(instance);
        if !self.instances.iter().any(|known| known.ptr_eq(&handle)) {
            self.instances.push(handle);
        }
    }

    /// Live registered instances, in registration order. Dropped instances are pruned as a
    /// side effect.
    pub(crate) fn live_instances(&mut self) -> Vec<Rc<NestedList<H>>> {
        self.instances.retain(|weak| weak.strong_count() > 0);
        self.instances
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    fn deregister(&mut self, instance: &Rc<NestedList<H>>) {
        let handle = Rc::downgrade(instance);
        self.instances
            .retain(|known| known.strong_count() > 0 && !known.ptr_eq(&handle));
    }

    fn is_empty(&self) -> bool {
        self.instances
            .iter()
            .all(|weak| weak.strong_count() == 0)
    }

    /// Drop the transient fields of a finished gesture.
    pub(crate) fn clear_drag(&mut self) {
        self.ghost = None;
        self.active = None;
        self.over = None;
        self.from = None;
        self.to = None;
        self.moved_from = None;
        self.last_mouse_y = 0.0;
        self.last_step_x = 0.0;
    }
}

/// Keyed registry of [`Context`]s. Owned by the embedder; contexts are created lazily by
/// [`NestedList::attach`](crate::NestedList::attach) and freed by [`ContextManager::dispose`]
/// once their last instance is gone.
pub struct ContextManager<H: HostTree> {
    contexts: HashMap<ContextId, Rc<RefCell<Context<H>>>>,
}

impl<H: HostTree> ContextManager<H> {
    pub fn new() -> Self {
        Self {
            contexts: HashMap::new(),
        }
    }

    /// Fetch the context registered under `id`, creating it when absent.
    pub fn get_or_create(&mut self, id: ContextId) -> Rc<RefCell<Context<H>>> {
        Rc::clone(
            self.contexts
                .entry(id)
                .or_insert_with(|| Rc::new(RefCell::new(Context::new()))),
        )
    }

    /// De-register `instance` from the context under `id`, dropping the context once no live
    /// instance remains registered in it.
    pub fn dispose(&mut self, id: &ContextId, instance: &Rc<NestedList<H>>) {
        let empty = match self.contexts.get(id) {
            Some(context) => {
                let mut context = context.borrow_mut();
                context.deregister(instance);
                context.is_empty()
            }
            None => return,
        };

        if empty {
            self.contexts.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl<H: HostTree> Default for ContextManager<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::memory::MemoryTree;
    use crate::host::HostTree;
    use crate::Options;

    fn instance(
        tree: &Rc<MemoryTree>,
        manager: &mut ContextManager<MemoryTree>,
        context: ContextId,
    ) -> Rc<NestedList<MemoryTree>> {
        let root = tree.node("ul", &["nl-list"]);
        tree.append(&tree.document_root(), &root);
        NestedList::attach(
            Rc::clone(tree),
            root,
            Options {
                context,
                ..Options::default()
            },
            manager,
        )
        .unwrap()
    }

    #[test]
    fn same_id_shares_a_context() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let a = instance(&tree, &mut manager, ContextId::from("g1"));
        let b = instance(&tree, &mut manager, ContextId::from("g1"));
        let c = instance(&tree, &mut manager, ContextId::from(7));

        assert_eq!(manager.len(), 2);
        let context = manager.get_or_create(ContextId::from("g1"));
        let live = context.borrow_mut().live_instances();
        assert_eq!(live.len(), 2);
        assert!(Rc::ptr_eq(&live[0], &a));
        assert!(Rc::ptr_eq(&live[1], &b));
        drop(c);
    }

    #[test]
    fn registration_deduplicates_by_identity() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let a = instance(&tree, &mut manager, ContextId::default());
        let context = manager.get_or_create(ContextId::default());
        context.borrow_mut().register(&a);
        context.borrow_mut().register(&a);

        assert_eq!(context.borrow_mut().live_instances().len(), 1);
    }

    #[test]
    fn dropped_instances_are_pruned_from_the_walk() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let a = instance(&tree, &mut manager, ContextId::default());
        let b = instance(&tree, &mut manager, ContextId::default());
        drop(a);

        let context = manager.get_or_create(ContextId::default());
        let live = context.borrow_mut().live_instances();
        assert_eq!(live.len(), 1);
        assert!(Rc::ptr_eq(&live[0], &b));
    }

    #[test]
    fn dispose_frees_the_context_once_empty() {
        let tree = Rc::new(MemoryTree::new());
        let mut manager = ContextManager::new();

        let a = instance(&tree, &mut manager, ContextId::from("g1"));
        let b = instance(&tree, &mut manager, ContextId::from("g1"));

        manager.dispose(&ContextId::from("g1"), &a);
        assert_eq!(manager.len(), 1);

        manager.dispose(&ContextId::from("g1"), &b);
        assert!(manager.is_empty());
    }
}
