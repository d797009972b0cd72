use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::error::{DeskError, Result};
use crate::presentation::{Presenter, ViewSnapshot, render_text};
use crate::runtime::DeskRuntime;

pub type DriverResult<T> = std::result::Result<T, CliDriverError>;

#[derive(Debug, Error)]
pub enum CliDriverError {
    #[error("runtime error: {0}")]
    Runtime(#[from] DeskError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Owns a `DeskRuntime` and manages raw mode, the alternate screen and mouse
/// capture around the live loop.
pub struct CliDriver {
    runtime: DeskRuntime,
}

impl CliDriver {
    pub fn new(mut runtime: DeskRuntime) -> Self {
        runtime.set_presenter(TerminalPresenter::new(io::stdout()));
        Self { runtime }
    }

    pub fn runtime(&self) -> &DeskRuntime {
        &self.runtime
    }

    pub fn run(mut self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.runtime.run().map_err(CliDriverError::from);
        self.exit(&mut stdout);
        result
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| CliDriverError::Terminal(err.to_string()))?;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Repaints the text summary from the top-left corner on every snapshot.
/// Raw mode needs explicit carriage returns, so line endings are rewritten.
pub struct TerminalPresenter<W: Write> {
    writer: W,
    label_width: usize,
    scratch: Vec<u8>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            label_width: 16,
            scratch: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, snapshot: &ViewSnapshot) -> Result<()> {
        self.scratch.clear();
        render_text(&mut self.scratch, snapshot, self.label_width)?;
        queue!(self.writer, MoveTo(0, 0), Clear(ClearType::All))?;
        for line in self.scratch.split(|byte| *byte == b'\n') {
            if line.is_empty() {
                continue;
            }
            self.writer.write_all(line)?;
            self.writer.write_all(b"\r\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
