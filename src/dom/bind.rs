//! Listener wiring between the browser and the drag core.
//!
//! A [`DomBinding`] owns the document-level gesture closures (installed on pick-up, removed on
//! release, the way a gesture only pays for tracking while it is running) and wires the
//! per-handle, per-item and per-button listeners. Listener closures capture a shared handle to
//! the binding and are leaked into the JS heap; bindings live for the lifetime of the page.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Date, Function};
use wasm_bindgen::{prelude::Closure, JsCast};
use web_sys::{Document, Element, MouseEvent, TouchEvent};

use crate::drag::PointerInput;
use crate::host::HostTree;
use crate::list::{NestedList, Placement};

use super::DomTree;

pub struct DomBinding {
    list: Rc<NestedList<DomTree>>,
    document: Document,
    has_touch: bool,

    // Gesture-scoped document listeners, kept so they can be removed again on release.
    on_mouse_move: RefCell<Option<Closure<dyn FnMut(MouseEvent)>>>,
    on_mouse_up: RefCell<Option<Closure<dyn FnMut(MouseEvent)>>>,
    on_touch_move: RefCell<Option<Closure<dyn FnMut(TouchEvent)>>>,
    on_touch_end: RefCell<Option<Closure<dyn FnMut(TouchEvent)>>>,
}

impl DomBinding {
    /// Wire `list` into the document: every handle under the root picks up, the root tracks
    /// cross-instance transfer, and the affordance buttons drive expand/collapse/extract.
    pub fn new(list: Rc<NestedList<DomTree>>, document: &Document) -> Rc<Self> {
        let has_touch = web_sys::window()
            .map(|window| window.navigator().max_touch_points() > 0)
            .unwrap_or(false);

        let binding = Rc::new(Self {
            list,
            document: document.clone(),
            has_touch,
            on_mouse_move: RefCell::new(None),
            on_mouse_up: RefCell::new(None),
            on_touch_move: RefCell::new(None),
            on_touch_end: RefCell::new(None),
        });

        Self::install_gesture_closures(&binding);
        Self::wire_root(&binding);
        for handle in binding.host().query_all(binding.list.root(), &binding.opts().handle_selector)
        {
            Self::wire_handle(&binding, &handle);
        }

        binding
    }

    pub fn list(&self) -> &Rc<NestedList<DomTree>> {
        &self.list
    }

    /// Insert an item through [`NestedList::add_item`] and, when it lands in the tree, wire
    /// its handles and buttons like any initial item.
    pub fn add_item(
        self: &Rc<Self>,
        item: &Element,
        placement: Option<Placement<Element>>,
    ) -> bool {
        if !self.list.add_item(item, placement) {
            return false;
        }

        if self.host().matches(item, &self.opts().handle_selector) {
            Self::wire_handle(self, item);
        }
        for handle in self.host().query_all(item, &self.opts().handle_selector) {
            Self::wire_handle(self, &handle);
        }

        true
    }

    fn host(&self) -> &DomTree {
        self.list.host()
    }

    fn opts(&self) -> &crate::Options {
        self.list.options()
    }

    /// Build the document-level move/up closures once; they are attached on every pick-up and
    /// detached again when the gesture ends.
    fn install_gesture_closures(binding: &Rc<Self>) {
        let b = Rc::clone(binding);
        *binding.on_mouse_move.borrow_mut() =
            Some(Closure::<dyn FnMut(MouseEvent)>::new(move |event| {
                b.list
                    .drag_to(event.client_x() as f64, event.client_y() as f64, Date::now());
            }));

        let b = Rc::clone(binding);
        *binding.on_mouse_up.borrow_mut() =
            Some(Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
                b.list.end_drag();
                b.detach_gesture_listeners();
            }));

        let b = Rc::clone(binding);
        *binding.on_touch_move.borrow_mut() =
            Some(Closure::<dyn FnMut(TouchEvent)>::new(move |event| {
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let x = touch.client_x() as f64;
                let y = touch.client_y() as f64;

                // Touch never fires mouseenter; resolve the hover target from the point.
                if let Some(over) = b.document.element_from_point(x as f32, y as f32) {
                    if let Some(item) = over
                        .closest(&b.opts().item_selector)
                        .expect("selector to parse")
                    {
                        if b.host().contains(b.list.root(), &item) {
                            b.list.enter_item(&item);
                        }
                    }
                }

                b.list.drag_to(x, y, Date::now());
            }));

        let b = Rc::clone(binding);
        *binding.on_touch_end.borrow_mut() =
            Some(Closure::<dyn FnMut(TouchEvent)>::new(move |_event| {
                b.list.end_drag();
                b.detach_gesture_listeners();
            }));
    }

    fn attach_gesture_listeners(&self) {
        self.listener(&self.on_mouse_move, |target, function| {
            target.add_event_listener_with_callback("mousemove", function).ok();
        });
        self.listener(&self.on_mouse_up, |target, function| {
            target.add_event_listener_with_callback("mouseup", function).ok();
        });
        if self.has_touch {
            self.listener(&self.on_touch_move, |target, function| {
                target.add_event_listener_with_callback("touchmove", function).ok();
            });
            self.listener(&self.on_touch_end, |target, function| {
                target.add_event_listener_with_callback("touchend", function).ok();
            });
        }
    }

    fn detach_gesture_listeners(&self) {
        self.listener(&self.on_mouse_move, |target, function| {
            target.remove_event_listener_with_callback("mousemove", function).ok();
        });
        self.listener(&self.on_mouse_up, |target, function| {
            target.remove_event_listener_with_callback("mouseup", function).ok();
        });
        if self.has_touch {
            self.listener(&self.on_touch_move, |target, function| {
                target.remove_event_listener_with_callback("touchmove", function).ok();
            });
            self.listener(&self.on_touch_end, |target, function| {
                target.remove_event_listener_with_callback("touchend", function).ok();
            });
        }
    }

    fn listener<T: ?Sized>(
        &self,
        closure: &RefCell<Option<Closure<T>>>,
        apply: impl Fn(&Document, &Function),
    ) {
        if let Some(closure) = closure.borrow().as_ref() {
            apply(&self.document, closure.as_ref().unchecked_ref());
        }
    }

    /// Pick-up listeners for one handle, hover tracking for its item, and the item's
    /// affordance buttons.
    fn wire_handle(binding: &Rc<Self>, handle: &Element) {
        let Some(item) = binding.host().closest(handle, &binding.opts().item_selector) else {
            return;
        };

        let b = Rc::clone(binding);
        let grabbed = item.clone();
        let on_down: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let input = PointerInput {
                x: event.client_x() as f64,
                y: event.client_y() as f64,
                cancelable: event.cancelable(),
                contacts: 1,
            };
            if b.list.begin_drag(&grabbed, input) {
                event.prevent_default();
                event.stop_propagation();
                b.attach_gesture_listeners();
            }
        })
        .into_js_value()
        .unchecked_into();
        handle
            .add_event_listener_with_callback("mousedown", &on_down)
            .expect("listener to attach");

        if binding.has_touch {
            let b = Rc::clone(binding);
            let grabbed = item.clone();
            let on_touch: Function =
                Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                    let touches = event.touches();
                    // Two or more contacts are pinch/zoom gestures; leave them alone.
                    let Some(touch) = touches.get(0) else {
                        return;
                    };
                    let input = PointerInput {
                        x: touch.client_x() as f64,
                        y: touch.client_y() as f64,
                        cancelable: event.cancelable(),
                        contacts: touches.length(),
                    };
                    if b.list.begin_drag(&grabbed, input) {
                        event.prevent_default();
                        event.stop_propagation();
                        b.attach_gesture_listeners();
                    }
                })
                .into_js_value()
                .unchecked_into();
            handle
                .add_event_listener_with_callback("touchstart", &on_touch)
                .expect("listener to attach");
        }

        let b = Rc::clone(binding);
        let entered = item.clone();
        let on_enter: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
            b.list.enter_item(&entered);
        })
        .into_js_value()
        .unchecked_into();
        item.add_event_listener_with_callback("mouseenter", &on_enter)
            .expect("listener to attach");

        let b = Rc::clone(binding);
        let left = item.clone();
        let on_leave: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
            b.list.leave_item(&left);
        })
        .into_js_value()
        .unchecked_into();
        item.add_event_listener_with_callback("mouseleave", &on_leave)
            .expect("listener to attach");

        Self::wire_buttons(binding, &item);
    }

    fn wire_buttons(binding: &Rc<Self>, item: &Element) {
        #[derive(Clone, Copy)]
        enum Action {
            Expand,
            Collapse,
            Extract,
        }

        let buttons = [
            (binding.opts().expand_btn.clone(), Action::Expand),
            (binding.opts().collapse_btn.clone(), Action::Collapse),
            (binding.opts().extract_btn.clone(), Action::Extract),
        ];

        for (selector, action) in buttons {
            let Some(button) = binding.host().query(item, &selector) else {
                continue;
            };

            let b = Rc::clone(binding);
            let source = button.clone();
            let on_click: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
                let Some(item) = b.host().closest(&source, &b.opts().item_selector) else {
                    return;
                };
                match action {
                    Action::Expand => b.list.expand(&item),
                    Action::Collapse => b.list.collapse(&item),
                    Action::Extract => b.list.extract(&item),
                }
            })
            .into_js_value()
            .unchecked_into();
            button
                .add_event_listener_with_callback("click", &on_click)
                .expect("listener to attach");
        }
    }

    /// Cross-instance transfer: entering the root adopts the active item, leaving it records
    /// this instance as the transfer source.
    fn wire_root(binding: &Rc<Self>) {
        let root = binding.list.root().clone();

        let b = Rc::clone(binding);
        let on_enter: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
            b.list.enter_root();
        })
        .into_js_value()
        .unchecked_into();
        root.add_event_listener_with_callback("mouseenter", &on_enter)
            .expect("listener to attach");

        let b = Rc::clone(binding);
        let on_leave: Function = Closure::<dyn FnMut(MouseEvent)>::new(move |_event| {
            b.list.leave_root();
        })
        .into_js_value()
        .unchecked_into();
        root.add_event_listener_with_callback("mouseleave", &on_leave)
            .expect("listener to attach");
    }
}
