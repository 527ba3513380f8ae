//! Drag-to-nest hierarchical lists.
//!
//! A [`NestedList`] binds to a root node of a host tree and lets the user reorder and re-nest
//! its items by dragging them, including across instances that share a [`ContextId`]. The
//! resulting hierarchy reads back through [`NestedList::serialize`] (flat, parent-indexed) or
//! [`NestedList::serialize_tree`] (nested).
//!
//! The core is host-agnostic: it consumes the document through the [`HostTree`] trait, so it
//! runs unchanged against [`host::memory::MemoryTree`] in native tests and against the
//! `web-sys` DOM (the [`dom`] module) on `wasm32`.
//!
//! ```
//! use std::rc::Rc;
//! use nested_list::host::memory::MemoryTree;
//! use nested_list::{ContextManager, HostTree, NestedList, Options};
//!
//! let tree = Rc::new(MemoryTree::new());
//! let root = tree.node("ul", &["nl-list"]);
//! tree.append(&tree.document_root(), &root);
//!
//! let mut manager = ContextManager::new();
//! let list = NestedList::attach(Rc::clone(&tree), root, Options::default(), &mut manager)
//!     .expect("fresh root");
//! assert!(list.serialize().expect("root is a list").is_empty());
//! ```

mod config;
mod context;
mod drag;
mod error;
mod event;
mod list;
mod serialize;
mod tree;
mod util;

pub mod host;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use config::{ClassList, Options};
pub use context::{Context, ContextId, ContextManager};
pub use drag::PointerInput;
pub use error::Error;
pub use event::{DispatchPolicy, EventCallback, EventKind, ListEvent};
pub use host::{HostTree, ItemData, Rect};
pub use list::{NestedList, Placement};
pub use serialize::{serialize_flat, serialize_tree, FlatRecord, TreeRecord};
