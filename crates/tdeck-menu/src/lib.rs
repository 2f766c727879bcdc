#![forbid(unsafe_code)]

//! Menu navigation for the TestDeck harness.
//!
//! The menu is a tree of [`MenuNode`]s built once from an already-filtered
//! catalog: the root lists suites (plus command entries), each suite lists
//! its cases. Navigation state is the *active path*: the chain of
//! `active_child` links from the root to the node that currently has focus.
//! At most one such path exists at any time; its tip is the display target.
//!
//! Nodes store suite and case *names* and resolve them through the
//! [`Catalog`](tdeck_core::Catalog) passed into each operation, so the
//! catalog stays the sole owner of suites.

pub mod node;
pub mod render;
pub mod surface;

pub use node::{MenuNode, MenuSignal, NodeKind};
pub use render::{render, RenderContext, ITEMS_PER_PAGE};
pub use surface::{MemorySurface, Surface};
