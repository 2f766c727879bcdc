#![forbid(unsafe_code)]

//! Terminal display surface.

use std::io::{self, Write};

use crossterm::cursor::{MoveTo, MoveToNextLine};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use tdeck_menu::Surface;
use tracing::warn;

/// Renders menu frames to a `Write` target using terminal control
/// sequences. Each present repaints the whole frame from the top left.
#[derive(Debug)]
pub struct TerminalSurface<W: Write> {
    out: W,
    lines: Vec<String>,
}

impl TerminalSurface<io::Stdout> {
    /// A surface over standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    /// A surface over an arbitrary writer.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines: Vec::new(),
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        self.out.queue(MoveTo(0, 0))?;
        self.out.queue(Clear(ClearType::All))?;
        for line in &self.lines {
            self.out.queue(Print(line))?;
            self.out.queue(MoveToNextLine(1))?;
        }
        self.out.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn present(&mut self) {
        if let Err(error) = self.draw() {
            warn!(%error, "surface present failed");
        }
    }
}
