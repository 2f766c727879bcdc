#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The driver consumes discrete button-edge events from an [`InputSource`].
//! Events carry the numeric index the source assigned to the originating
//! controller; the driver tracks a bounded number of these identities and
//! treats out-of-range indices as collaborator contract violations.
//!
//! # Design Notes
//!
//! - Only release edges trigger menu operations; press edges exist so
//!   sources can report both sides of a transition without the driver
//!   repeat-firing on held buttons.
//! - Keyboard front ends map onto the same pad-button vocabulary via
//!   [`PadButton::from_key`].

use crossterm::event::KeyCode;

/// Logical pad buttons understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    /// Move the cursor up one entry.
    Up,
    /// Move the cursor down one entry.
    Down,
    /// Reserved horizontal movement.
    Left,
    /// Reserved horizontal movement.
    Right,
    /// Activate the current selection.
    Confirm,
    /// Pop one level of the active path; exits at the root.
    Back,
    /// Run every case of the suite on the active path.
    RunSuite,
    /// Run everything and stop the driver.
    RunAll,
}

impl PadButton {
    /// Map a keyboard key onto a pad button, if one applies.
    #[must_use]
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Self::Confirm),
            KeyCode::Esc | KeyCode::Backspace => Some(Self::Back),
            KeyCode::Char('s') => Some(Self::RunSuite),
            KeyCode::Char('r') => Some(Self::RunAll),
            _ => None,
        }
    }
}

/// Which side of a button transition an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    /// Button went down.
    Press,
    /// Button came back up. This is the actionable edge.
    Release,
}

/// A discrete event produced by an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A controller appeared under the given source-assigned index.
    SourceAttached {
        /// Index assigned by the input source.
        index: usize,
    },
    /// The controller at the given index went away.
    SourceDetached {
        /// Index assigned by the input source.
        index: usize,
    },
    /// A button transitioned on the controller at `index`.
    Button {
        /// Index of the originating controller.
        index: usize,
        /// Which logical button transitioned.
        button: PadButton,
        /// Which side of the transition this event reports.
        edge: ButtonEdge,
    },
}

impl InputEvent {
    /// Shorthand for a release-edge button event.
    #[must_use]
    pub const fn release(index: usize, button: PadButton) -> Self {
        Self::Button {
            index,
            button,
            edge: ButtonEdge::Release,
        }
    }

    /// Shorthand for a press-edge button event.
    #[must_use]
    pub const fn press(index: usize, button: PadButton) -> Self {
        Self::Button {
            index,
            button,
            edge: ButtonEdge::Press,
        }
    }
}

/// Non-blocking producer of input events.
///
/// Implementations drain whatever their backend has pending and return one
/// event per call, in arrival order, until exhausted.
pub trait InputSource {
    /// Return the next pending event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<InputEvent>;
}
