//! Browser integration: a [`HostTree`] over the live DOM plus the listener glue
//! ([`DomBinding`]) that feeds pointer events into the core.

mod bind;

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::Options;
use crate::context::ContextManager;
use crate::error::Error;
use crate::host::{HostTree, ItemData, Rect};
use crate::list::NestedList;

pub use bind::DomBinding;

/// [`HostTree`] implementation backed by `web-sys`. Nodes are [`web_sys::Element`] handles;
/// selector strings go straight to the browser's selector engine.
pub struct DomTree {
    document: Document,
}

impl DomTree {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Build from the global window.
    pub fn from_window() -> Self {
        let window = web_sys::window().expect("no global `window` exists");
        let document = window.document().expect("should have a document on window");

        Self::new(document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl HostTree for DomTree {
    type Node = Element;

    fn query(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).expect("selector to parse")
    }

    fn query_all(&self, scope: &Element, selector: &str) -> Vec<Element> {
        let nodes = scope
            .query_selector_all(selector)
            .expect("selector to parse");

        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn matches(&self, node: &Element, selector: &str) -> bool {
        node.matches(selector).expect("selector to parse")
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).expect("selector to parse")
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();

        (0..children.length())
            .filter_map(|index| children.item(index))
            .collect()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn prev_sibling(&self, node: &Element) -> Option<Element> {
        node.previous_element_sibling()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn create(&self, tag: &str) -> Element {
        self.document
            .create_element(tag)
            .expect("element to be created")
    }

    fn insert_before(&self, parent: &Element, node: &Element, anchor: Option<&Element>) {
        parent
            .insert_before(node, anchor.map(|anchor| anchor.as_ref()))
            .expect("node inserted into parent");
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn clone_node(&self, node: &Element) -> Element {
        node.clone_node_with_deep(true)
            .expect("node to be cloned")
            .unchecked_into()
    }

    fn add_class(&self, node: &Element, class: &str) {
        node.class_list().add_1(class).ok();
    }

    fn remove_class(&self, node: &Element, class: &str) {
        node.class_list().remove_1(class).ok();
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };

        if value.is_empty() {
            element.style().remove_property(property).ok();
        } else {
            element.style().set_property(property, value).ok();
        }
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        let window = web_sys::window()?;
        let style = window.get_computed_style(node).ok().flatten()?;
        let value = style.get_property_value(property).ok()?;

        (!value.is_empty()).then_some(value)
    }

    fn data(&self, node: &Element) -> ItemData {
        let mut data = ItemData::new();
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return data;
        };

        let dataset = element.dataset();
        for key in js_sys::Object::keys(dataset.unchecked_ref()).iter() {
            if let Some(key) = key.as_string() {
                if let Some(value) = dataset.get(&key) {
                    data.insert(key, value);
                }
            }
        }

        data
    }

    fn set_data(&self, node: &Element, key: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.dataset().set(key, value).ok();
        }
    }

    fn rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();

        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn document_root(&self) -> Element {
        self.document.body().expect("document body to exist").into()
    }
}

/// Bind a widget to the first element matching `selector` and wire all of its DOM listeners.
///
/// The usual entry point in the browser: resolves the root, attaches a [`NestedList`] over a
/// [`DomTree`], and returns the [`DomBinding`] that keeps the listeners alive.
pub fn attach(
    selector: &str,
    options: Options,
    manager: &mut ContextManager<DomTree>,
) -> Result<Rc<DomBinding>, Error> {
    // Route panics to console.error before anything else can go wrong.
    console_error_panic_hook::set_once();

    let host = Rc::new(DomTree::from_window());
    let document = host.document().clone();
    let list = NestedList::attach_selector(host, selector, options, manager)?;

    Ok(DomBinding::new(list, &document))
}
