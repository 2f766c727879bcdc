#![forbid(unsafe_code)]

//! TestDeck public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the common types from the internal crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! The usual flow: register suites into a [`Catalog`], load a
//! [`RuntimeConfig`] (falling back to defaults when the document is missing
//! or malformed), apply it to the catalog, then hand the filtered catalog
//! to a [`Driver`] with an input source and a display surface.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use tdeck_core::{
    ButtonEdge, Catalog, InputEvent, InputSource, PadButton, TestCase, TestSuite,
};

// --- Config re-exports -----------------------------------------------------

pub use tdeck_config::{
    ConfigError, ParseMode, RuntimeConfig, SkipOverride, DEFAULT_OUTPUT_DIRECTORY,
    MAX_CONFIG_FILE_SIZE,
};

// --- Menu re-exports -------------------------------------------------------

pub use tdeck_menu::{
    render, MemorySurface, MenuNode, MenuSignal, NodeKind, RenderContext, Surface,
    ITEMS_PER_PAGE,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tdeck_runtime::{
    Driver, DriverOptions, ExitReason, ScriptedInput, TerminalInput, TerminalSurface,
    MAX_INPUT_SOURCES,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tdeck apps.
#[derive(Debug)]
pub enum Error {
    /// I/O failure outside configuration handling.
    Io(std::io::Error),
    /// Configuration loading or writing failed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for tdeck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Catalog, Driver, DriverOptions, Error, ExitReason, InputEvent, InputSource, MenuNode,
        PadButton, ParseMode, Result, RuntimeConfig, SkipOverride, Surface, TestSuite,
    };

    pub use crate::{config, core, menu, runtime};
}

pub use tdeck_config as config;
pub use tdeck_core as core;
pub use tdeck_menu as menu;
pub use tdeck_runtime as runtime;
