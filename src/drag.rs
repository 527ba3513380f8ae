//! The pick-up → move → release state machine.
//!
//! Host glue (or a test) feeds pointer events in; the nest/un-nest thresholding, the vertical
//! insertion rule and the cross-instance transfer all fall out of the shared
//! [`Context`](crate::Context) state. Structural decisions are gated by a settle window
//! so a nest is never immediately undone by a contradictory un-nest while the host's layout is
//! still catching up with the previous mutation.

use tracing::debug;

use crate::event::{dispatch, EventKind};
use crate::host::HostTree;
use crate::list::NestedList;

/// Minimum interval between structural decisions during a move. Ghost positioning is not
/// gated.
const MOVE_SETTLE_MS: f64 = 100.0;

/// A pick-up gesture as the core sees it: pointer position plus the two facts that decide
/// suppression.
#[derive(Clone, Copy, Debug)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    /// Whether the originating input event may be canceled. A non-cancelable touchstart means
    /// a native scroll gesture is in progress; the pick-up yields to it.
    pub cancelable: bool,
    /// Simultaneous contacts. More than one suppresses the pick-up (pinch/zoom territory).
    pub contacts: u32,
}

impl PointerInput {
    /// A single-button mouse press at the given position.
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            cancelable: true,
            contacts: 1,
        }
    }

    pub fn touch(x: f64, y: f64, contacts: u32, cancelable: bool) -> Self {
        Self {
            x,
            y,
            cancelable,
            contacts,
        }
    }
}

impl<H: HostTree> NestedList<H> {
    /// Pick `item` up, entering the Dragging state.
    ///
    /// Suppressed (returning `false`) when the input is not cancelable, when more than one
    /// contact is down, or when this context already has an active item. On success the ghost
    /// exists, the item carries the active classes, and `Start` has been dispatched.
    pub fn begin_drag(&self, item: &H::Node, input: PointerInput) -> bool {
        if !input.cancelable || input.contacts > 1 {
            return false;
        }
        if self.ctx.borrow().active.is_some() {
            return false;
        }

        let ghost = self.host.clone_node(item);
        for class in self.opts.drag_class.iter() {
            self.host.add_class(&ghost, class);
        }
        self.host.append(&self.host.document_root(), &ghost);

        // Track the pointer without intercepting further pointer targeting.
        self.host.set_style(&ghost, "position", "fixed");
        self.host.set_style(&ghost, "pointer-events", "none");
        self.host.set_style(&ghost, "left", &format!("{}px", input.x));
        self.host.set_style(&ghost, "top", &format!("{}px", input.y));

        for class in self.opts.active_class.iter() {
            self.host.add_class(item, class);
        }

        let from = self.host.parent(item);
        {
            let mut ctx = self.ctx.borrow_mut();
            ctx.ghost = Some(ghost);
            ctx.active = Some(item.clone());
            ctx.last_mouse_y = input.y;
            ctx.last_step_x = input.x;
            ctx.from = from;
            ctx.to = None;
        }

        debug!(event = "start", "drag began");
        dispatch(&*self.host, &self.ctx, EventKind::Start, item);

        true
    }

    /// Continuous pointer motion while Dragging.
    ///
    /// The ghost follows every call; structural decisions (nest, un-nest, reorder) are only
    /// evaluated once per settle window, and an un-nest ends its cycle immediately so it
    /// cannot be undone by a reorder against a stale hover target.
    pub fn drag_to(&self, x: f64, y: f64, now_ms: f64) {
        let (ghost, active) = {
            let ctx = self.ctx.borrow();
            (ctx.ghost.clone(), ctx.active.clone())
        };
        let Some(active) = active else {
            return;
        };

        if let Some(ghost) = ghost {
            self.host.set_style(&ghost, "left", &format!("{x}px"));
            self.host.set_style(&ghost, "top", &format!("{y}px"));
        }

        let (last_y, last_step_x) = {
            let mut ctx = self.ctx.borrow_mut();
            if now_ms - ctx.last_move < MOVE_SETTLE_MS {
                return;
            }
            ctx.last_move = now_ms;

            let last_y = ctx.last_mouse_y;
            ctx.last_mouse_y = y;

            (last_y, ctx.last_step_x)
        };

        if x - last_step_x > self.opts.threshold {
            self.nest(&active);
            self.ctx.borrow_mut().last_step_x = x;
        } else if last_step_x - x > self.opts.threshold {
            self.unnest(&active);
            self.ctx.borrow_mut().last_step_x = x;

            // Evaluating a reorder now could re-nest against the pre-un-nest layout; let the
            // cycle end here.
            return;
        }

        let Some(target) = self.ctx.borrow().over.clone() else {
            return;
        };
        let rect = self.host.rect(&target);

        // The pointer has to genuinely cross into the target's band before the active item
        // jumps past it; hovering near the boundary does nothing.
        if last_y < y {
            if y > rect.top() {
                if let Some(parent) = self.host.parent(&target) {
                    let next = self.host.next_sibling(&target);
                    self.move_to(&parent, next.as_ref());
                }
            }
        } else if y < rect.bottom() {
            if let Some(parent) = self.host.parent(&target) {
                self.move_to(&parent, Some(&target));
            }
        }
    }

    /// Move the active item one level deeper: into the sub-list of its previous sibling,
    /// creating that sub-list when absent.
    fn nest(&self, active: &H::Node) {
        let Some(target) = self.host.prev_sibling(active) else {
            return;
        };

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

        self.move_to(&list, None);
        self.expand(&target);
        self.show_extract(&target);

        dispatch(&*self.host, &self.ctx, EventKind::Nest, active);
    }

    /// Move the active item one level shallower: out of its owning item's sub-list, to the
    /// owning item's next-sibling position. No-op when already top-level.
    fn unnest(&self, active: &H::Node) {
        let Some(parent_list) = self.host.parent(active) else {
            return;
        };
        let Some(owner) = self.host.closest(&parent_list, &self.opts.item_selector) else {
            return;
        };
        let Some(destination) = self.host.parent(&owner) else {
            return;
        };

        let next = self.host.next_sibling(&owner);
        self.move_to(&destination, next.as_ref());

        dispatch(&*self.host, &self.ctx, EventKind::Unnest, active);
    }

    /// The pointer entered `item`'s bounds mid-drag: track it as the hover target. The active
    /// item and its descendants are never valid targets; reaching one clears the target
    /// instead.
    pub fn enter_item(&self, item: &H::Node) {
        let mut ctx = self.ctx.borrow_mut();
        let Some(active) = ctx.active.clone() else {
            return;
        };

        if self.host.contains(&active, item) {
            ctx.over = None;
            return;
        }
        ctx.over = Some(item.clone());
    }

    /// The pointer left `item`'s bounds; clear it as the hover target.
    pub fn leave_item(&self, item: &H::Node) {
        let mut ctx = self.ctx.borrow_mut();
        if ctx.over.as_ref() == Some(item) {
            ctx.over = None;
        }
    }

    /// The pointer entered this instance's root mid-drag: adopt the active item into this
    /// instance's List, then report the transfer: `MoveOut` from the instance the item left,
    /// `MoveIn` from this one.
    pub fn enter_root(&self) {
        let Some(active) = self.ctx.borrow().active.clone() else {
            return;
        };

        if self.host.matches(&self.root, &self.opts.list_selector) {
            self.move_to(&self.root, None);
        } else if let Some(list) = self.host.query(&self.root, &self.opts.list_selector) {
            self.move_to(&list, None);
        }

        let moved_from = self.ctx.borrow_mut().moved_from.take();
        if let Some(instance) = moved_from.and_then(|weak| weak.upgrade()) {
            instance.emit_direct(EventKind::MoveOut, &active);
        }
        self.emit_direct(EventKind::MoveIn, &active);
    }

    /// The pointer left this instance's root mid-drag; remember it as the transfer source.
    pub fn leave_root(&self) {
        let mut ctx = self.ctx.borrow_mut();
        if ctx.active.is_none() {
            return;
        }
        ctx.moved_from = Some(self.self_weak.clone());
    }

    /// Release: destroy the ghost, strip the active marking, dispatch `Release`, clear the
    /// transient context. Safe to call at any time, including without a drag in progress.
    pub fn end_drag(&self) {
        let (ghost, active) = {
            let ctx = self.ctx.borrow();
            (ctx.ghost.clone(), ctx.active.clone())
        };

        if let Some(ghost) = ghost {
            self.host.remove(&ghost);
        }

        if let Some(active) = &active {
            for class in self.opts.active_class.iter() {
                self.host.remove_class(active, class);
            }
            debug!(event = "release", "drag ended");
            dispatch(&*self.host, &self.ctx, EventKind::Release, active);
        }

        self.ctx.borrow_mut().clear_drag();
    }
}
