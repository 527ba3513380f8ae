use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::config::Options;
use crate::context::{Context, ContextManager};
use crate::error::Error;
use crate::event::{DispatchPolicy, EventCallback, EventKind, ListEvent};
use crate::host::HostTree;
use crate::serialize::{self, FlatRecord, TreeRecord};
use crate::util::HashMapList;

/// Data-map marker guarding against binding two instances to one root.
pub(crate) const BOUND_MARKER: &str = "nlBound";

/// Where [`NestedList::add_item`] places a programmatically inserted item.
#[derive(Clone, Debug)]
pub enum Placement<N> {
    /// Immediately before the given item.
    Before(N),
    /// Immediately after the given item.
    After(N),
    /// Into the given node: appended when it is a List, otherwise into the item's sub-list,
    /// synthesizing one when absent.
    Inside(N),
}

/// One configured widget bound to a root node of the host tree.
///
/// Instances are shared handles (`Rc<NestedList<_>>`): the session context keeps a weak
/// reference for event dispatch, and host-side glue clones the handle into its listeners. All
/// methods take `&self`; transient gesture state lives in the shared [`Context`].
pub struct NestedList<H: HostTree> {
    pub(crate) host: Rc<H>,
    pub(crate) root: H::Node,
    pub(crate) opts: Options,
    pub(crate) ctx: Rc<RefCell<Context<H>>>,
    events: RefCell<HashMapList<EventKind, Rc<EventCallback<H>>>>,
    pub(crate) self_weak: Weak<NestedList<H>>,
}

impl<H: HostTree> NestedList<H> {
    /// Bind a new instance to `root`.
    ///
    /// Creates (or joins) the session context named by `options.context` and normalizes the
    /// affordances of every item under the root that owns a drag handle. Fails with
    /// [`Error::AlreadyBound`] when another instance already claimed the same root.
    pub fn attach(
        host: Rc<H>,
        root: H::Node,
        options: Options,
        manager: &mut ContextManager<H>,
    ) -> Result<Rc<Self>, Error> {
        if host.data(&root).contains_key(BOUND_MARKER) {
            return Err(Error::AlreadyBound);
        }
        host.set_data(&root, BOUND_MARKER, "true");

        let mut opts = options;
        if opts.list_selector.is_empty() {
            opts.list_selector = opts.list_tag.clone();
        }

        let context = manager.get_or_create(opts.context.clone());
        let list = Rc::new_cyclic(|self_weak| Self {
            host,
            root,
            opts,
            ctx: Rc::clone(&context),
            events: RefCell::new(HashMapList::new()),
            self_weak: self_weak.clone(),
        });
        context.borrow_mut().register(&list);

        for handle in list.host.query_all(&list.root, &list.opts.handle_selector) {
            if let Some(item) = list.host.closest(&handle, &list.opts.item_selector) {
                list.prepare_item(&item);
            }
        }

        Ok(list)
    }

    /// Like [`NestedList::attach`], resolving the root by selector under the document root.
    /// Fails with [`Error::MissingRoot`] when nothing matches.
    pub fn attach_selector(
        host: Rc<H>,
        selector: &str,
        options: Options,
        manager: &mut ContextManager<H>,
    ) -> Result<Rc<Self>, Error> {
        let root = host
            .query(&host.document_root(), selector)
            .ok_or(Error::MissingRoot)?;

        Self::attach(host, root, options, manager)
    }

    pub fn root(&self) -> &H::Node {
        &self.root
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Subscribe `callback` to one event kind. Returns `&self` so registrations chain.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> &Self
    where
        F: Fn(&NestedList<H>, &ListEvent<H>) + 'static,
    {
        self.events.borrow_mut().insert(kind, Rc::new(callback));
        self
    }

    /// Subscribe `callback` to every kind after which the hierarchy may differ from the last
    /// read ([`EventKind::CHANGE`]).
    pub fn on_change<F>(&self, callback: F) -> &Self
    where
        F: Fn(&NestedList<H>, &ListEvent<H>) + 'static,
    {
        let callback: Rc<EventCallback<H>> = Rc::new(callback);
        for kind in EventKind::CHANGE {
            self.events.borrow_mut().insert(kind, Rc::clone(&callback));
        }

        self
    }

    /// Snapshot of the subscribers for `kind`, so dispatch never holds the table borrowed
    /// while a callback runs.
    pub(crate) fn callbacks(&self, kind: EventKind) -> Vec<Rc<EventCallback<H>>> {
        self.events
            .borrow()
            .get(&kind)
            .map(|callbacks| callbacks.to_vec())
            .unwrap_or_default()
    }

    /// Deliver a [`DispatchPolicy::Direct`] event from this instance.
    pub(crate) fn emit_direct(&self, kind: EventKind, item: &H::Node) {
        debug_assert_eq!(kind.policy(), DispatchPolicy::Direct);

        let event = ListEvent {
            item: item.clone(),
            from: None,
            to: None,
        };
        for callback in self.callbacks(kind) {
            callback(self, &event);
        }
    }

    /// Export the hierarchy under this instance's root as a flat, parent-indexed array.
    pub fn serialize(&self) -> Result<Vec<FlatRecord>, Error> {
        serialize::serialize_flat(&*self.host, &self.root, &self.opts.list_selector)
    }

    /// Export the hierarchy under this instance's root as nested records.
    pub fn serialize_tree(&self) -> Result<Vec<TreeRecord>, Error> {
        serialize::serialize_tree(&*self.host, &self.root, &self.opts.list_selector)
    }

    /// Insert a new item programmatically.
    ///
    /// The node must match the configured item selector and carry a drag handle; violations
    /// are logged and leave the tree unchanged. Without a placement the item is appended to
    /// the instance's first List. Returns whether the item was inserted (host glue uses this
    /// to decide whether to wire listeners).
    pub fn add_item(&self, item: &H::Node, placement: Option<Placement<H::Node>>) -> bool {
        if !self.host.matches(item, &self.opts.item_selector) {
            warn!(
                selector = %self.opts.item_selector,
                "provided item does not match the configured item selector"
            );
            return false;
        }

        let has_handle = self.host.matches(item, &self.opts.handle_selector)
            || self.host.query(item, &self.opts.handle_selector).is_some();
        if !has_handle {
            warn!(
                selector = %self.opts.handle_selector,
                "provided item does not have a drag handle"
            );
            return false;
        }

        self.prepare_item(item);

        let Some(placement) = placement else {
            let list = if self.host.matches(&self.root, &self.opts.list_selector) {
                Some(self.root.clone())
            } else {
                self.host.query(&self.root, &self.opts.list_selector)
            };
            return match list {
                Some(list) => {
                    self.host.append(&list, item);
                    true
                }
                None => {
                    warn!("no list found to append the item to");
                    false
                }
            };
        };

        match placement {
            Placement::Before(target) => match self.host.parent(&target) {
                Some(parent) => {
                    self.host.insert_before(&parent, item, Some(&target));
                    true
                }
                None => {
                    warn!("placement target is not in a list");
                    false
                }
            },
            Placement::After(target) => match self.host.parent(&target) {
                Some(parent) => {
                    let next = self.host.next_sibling(&target);
                    self.host.insert_before(&parent, item, next.as_ref());
                    true
                }
                None => {
                    warn!("placement target is not in a list");
                    false
                }
            },
            Placement::Inside(target) => {
                if self.host.matches(&target, &self.opts.list_selector) {
                    self.host.append(&target, item);
                    return true;
                }

                let list = match self.direct_sublist(&target) {
                    Some(list) => list,
                    None => {
                        let list = self.host.create(&self.opts.list_tag);
                        for class in self.opts.list_class.iter() {
                            self.host.add_class(&list, class);
                        }
                        self.host.append(&target, &list);
                        list
                    }
                };
                self.host.append(&list, item);
                self.expand(&target);
                self.show_extract(&target);
                true
            }
        }
    }
}
