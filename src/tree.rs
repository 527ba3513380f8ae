//! Structural mutations: the relocation primitive behind every nest/un-nest/reorder, sub-list
//! extraction, and the expand/collapse visibility toggles.
//!
//! `move_to` is deliberately ordered capture → `BeforeMove` → relocate → cleanup →
//! `AfterMove`: subscribers always observe a consistent before/after pair, and a List emptied
//! by the relocation is removed in the same step, so no zero-child List ever survives a
//! mutation.

use crate::event::{dispatch, EventKind};
use crate::host::HostTree;
use crate::list::NestedList;

impl<H: HostTree> NestedList<H> {
    /// The item's at-most-one direct sub-list.
    pub(crate) fn direct_sublist(&self, item: &H::Node) -> Option<H::Node> {
        self.host
            .children(item)
            .into_iter()
            .find(|child| self.host.matches(child, &self.opts.list_selector))
    }

    /// Relocate the active item into `to`, immediately before `before` (appended when absent).
    ///
    /// No-op without an active item. When the move empties the source List, that List is
    /// removed and the affordances of its former owning item are hidden.
    pub(crate) fn move_to(&self, to: &H::Node, before: Option<&H::Node>) {
        let Some(active) = self.ctx.borrow().active.clone() else {
            return;
        };

        // Capture the source list and its owning item before anything moves.
        let old_list = self.host.closest(&active, &self.opts.list_selector);
        let old_owner = old_list
            .as_ref()
            .and_then(|list| self.host.closest(list, &self.opts.item_selector));

        {
            let mut ctx = self.ctx.borrow_mut();
            ctx.from = self.host.parent(&active);
            ctx.to = Some(to.clone());
        }
        dispatch(&*self.host, &self.ctx, EventKind::BeforeMove, &active);

        self.host.insert_before(to, &active, before);

        if let Some(list) = old_list {
            if self.host.children(&list).is_empty() {
                self.host.remove(&list);
                // No children, no controls.
                if let Some(owner) = old_owner {
                    self.hide_actions(&owner);
                }
            }
        }

        dispatch(&*self.host, &self.ctx, EventKind::AfterMove, &active);
    }

    /// Promote all of `item`'s sub-list children to its own next siblings, in order, then
    /// remove the emptied sub-list. No-op without a sub-list or outside a list.
    pub fn extract(&self, item: &H::Node) {
        let Some(sublist) = self.direct_sublist(item) else {
            return;
        };
        let Some(parent) = self.host.parent(item) else {
            return;
        };

        {
            let mut ctx = self.ctx.borrow_mut();
            ctx.from = Some(sublist.clone());
            ctx.to = Some(parent.clone());
        }

        let before = self.host.next_sibling(item);
        loop {
            let Some(child) = self.host.children(&sublist).into_iter().next() else {
                break;
            };
            self.host.insert_before(&parent, &child, before.as_ref());
        }
        self.host.remove(&sublist);
        self.hide_actions(item);

        dispatch(&*self.host, &self.ctx, EventKind::Extract, item);

        let mut ctx = self.ctx.borrow_mut();
        ctx.from = None;
        ctx.to = None;
    }

    /// Show `item`'s sub-list, hiding the expand control and surfacing the collapse control.
    /// Pure visibility toggle; no-op without a sub-list.
    pub fn expand(&self, item: &H::Node) {
        if let Some(button) = self.host.query(item, &self.opts.expand_btn) {
            self.host.set_style(&button, "display", "none");
        }

        let Some(list) = self.direct_sublist(item) else {
            return;
        };
        self.host.set_style(&list, "display", "");

        if let Some(button) = self.host.query(item, &self.opts.collapse_btn) {
            self.host.set_style(&button, "display", "");
        }
    }

    /// Hide `item`'s sub-list, hiding the collapse control and surfacing the expand control.
    /// Pure visibility toggle; no-op without a sub-list.
    pub fn collapse(&self, item: &H::Node) {
        if let Some(button) = self.host.query(item, &self.opts.collapse_btn) {
            self.host.set_style(&button, "display", "none");
        }

        let Some(list) = self.direct_sublist(item) else {
            return;
        };
        self.host.set_style(&list, "display", "none");

        if let Some(button) = self.host.query(item, &self.opts.expand_btn) {
            self.host.set_style(&button, "display", "");
        }
    }

    pub(crate) fn hide_actions(&self, item: &H::Node) {
        for selector in [
            &self.opts.expand_btn,
            &self.opts.collapse_btn,
            &self.opts.extract_btn,
        ] {
            if let Some(button) = self.host.query(item, selector) {
                self.host.set_style(&button, "display", "none");
            }
        }
    }

    pub(crate) fn show_extract(&self, item: &H::Node) {
        if let Some(button) = self.host.query(item, &self.opts.extract_btn) {
            self.host.set_style(&button, "display", "");
        }
    }

    /// Normalize a fresh item's affordances against its current sub-list state: expand hidden
    /// while the sub-list is visible, collapse hidden while it is absent or hidden, extract
    /// hidden (and an already-empty sub-list removed) when there is nothing to extract.
    pub(crate) fn prepare_item(&self, item: &H::Node) {
        let sublist = self.direct_sublist(item);
        let hidden = sublist
            .as_ref()
            .and_then(|list| self.host.style(list, "display"))
            .as_deref()
            == Some("none");

        if let Some(button) = self.host.query(item, &self.opts.expand_btn) {
            let display = if hidden { "" } else { "none" };
            self.host.set_style(&button, "display", display);
        }

        if let Some(button) = self.host.query(item, &self.opts.collapse_btn) {
            let display = if sublist.is_none() || hidden { "none" } else { "" };
            self.host.set_style(&button, "display", display);
        }

        if let Some(button) = self.host.query(item, &self.opts.extract_btn) {
            match &sublist {
                Some(list) if !self.host.children(list).is_empty() => {
                    self.host.set_style(&button, "display", "");
                }
                Some(list) => {
                    // A structurally invalid empty sub-list; drop it.
                    self.host.remove(list);
                    self.host.set_style(&button, "display", "none");
                }
                None => {
                    self.host.set_style(&button, "display", "none");
                }
            }
        }
    }
}
