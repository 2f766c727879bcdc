#![forbid(unsafe_code)]

//! Input source implementations.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tdeck_core::{InputEvent, InputSource, PadButton};
use tracing::warn;

/// Terminal-backed input source.
///
/// Keyboard events are mapped onto pad buttons and reported as source 0.
/// The terminal should be in raw mode while this source is polled.
#[derive(Debug, Default)]
pub struct TerminalInput {
    pending: VecDeque<InputEvent>,
    announced: bool,
}

impl TerminalInput {
    /// Create a terminal input source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue_key(&mut self, key: KeyEvent) {
        let Some(button) = PadButton::from_key(key.code) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press => {
                // Most terminals never deliver key release events; forward
                // the press and synthesize the matching release so the
                // driver's release-edge rule still fires.
                self.pending.push_back(InputEvent::press(0, button));
                self.pending.push_back(InputEvent::release(0, button));
            }
            KeyEventKind::Release => self.pending.push_back(InputEvent::release(0, button)),
            KeyEventKind::Repeat => {}
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        if !self.announced {
            self.announced = true;
            return Some(InputEvent::SourceAttached { index: 0 });
        }
        if let Some(queued) = self.pending.pop_front() {
            return Some(queued);
        }

        while event::poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.enqueue_key(key),
                Ok(_) => {}
                Err(error) => {
                    warn!(%error, "terminal input read failed");
                    break;
                }
            }
        }
        self.pending.pop_front()
    }
}

/// Replays a canned event script.
///
/// Events are grouped into frames; each frame drains fully, then the
/// source reports empty once so the driver finishes its loop iteration
/// before the next frame starts. Useful for tests and unattended runs.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<VecDeque<InputEvent>>,
}

impl ScriptedInput {
    /// A script whose events all arrive in the first frame.
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self::frames(vec![events.into_iter().collect()])
    }

    /// A script with explicit frame boundaries.
    #[must_use]
    pub fn frames(frames: Vec<Vec<InputEvent>>) -> Self {
        Self {
            frames: frames
                .into_iter()
                .map(|frame| frame.into_iter().collect())
                .collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        let frame = self.frames.front_mut()?;
        match frame.pop_front() {
            Some(queued) => Some(queued),
            None => {
                self.frames.pop_front();
                None
            }
        }
    }
}
