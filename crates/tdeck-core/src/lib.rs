#![forbid(unsafe_code)]

//! Catalog and input primitives for the TestDeck harness.
//!
//! This crate holds the two leaf-level building blocks everything else is
//! assembled from:
//!
//! - [`catalog`]: named test suites and cases, registered in an explicit
//!   caller-supplied order and filtered in place by the config layer.
//! - [`event`]: discrete pad-style input events with a stable per-source
//!   identity, plus the [`event::InputSource`] seam the driver polls.
//!
//! Test case bodies are opaque to this crate: a case is a name and a
//! zero-argument action. Whatever device work the action performs happens
//! synchronously inside the action itself.

pub mod catalog;
pub mod event;

pub use catalog::{Catalog, TestCase, TestSuite};
pub use event::{ButtonEdge, InputEvent, InputSource, PadButton};
