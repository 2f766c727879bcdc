#![forbid(unsafe_code)]

//! Driver runtime for the TestDeck harness.
//!
//! The [`Driver`] owns the filtered catalog and the menu built from it,
//! tracks a bounded set of input sources, and runs the single-threaded
//! poll/act/render loop until something inside the menu (or the autorun
//! countdown) asks it to stop.
//!
//! Concrete collaborators live here too: [`TerminalInput`] maps terminal
//! key events onto pad buttons, [`ScriptedInput`] replays canned event
//! sequences for tests and unattended runs, and [`TerminalSurface`] renders
//! menu frames to any `Write` target.

pub mod driver;
pub mod input;
pub mod surface;

pub use driver::{Driver, DriverOptions, ExitReason, MAX_INPUT_SOURCES};
pub use input::{ScriptedInput, TerminalInput};
pub use surface::TerminalSurface;
