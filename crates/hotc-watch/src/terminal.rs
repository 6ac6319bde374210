//! Terminal driver for the watch face.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Companion outcomes arrive on a
//! tokio channel fed by [`crate::companion::Companion`].

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use hotc_app::{AppEvent, Button, Driver, Screen};
use hotc_core::TransportEvent;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::ui;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal stopped producing input events.
    #[error("terminal input closed")]
    InputClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the terminal in raw mode on the alternate screen until stopped or
/// dropped.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    companion: UnboundedReceiver<TransportEvent>,
    restored: bool,
}

impl TerminalDriver {
    /// Take over the terminal. Outcomes are read from `companion`.
    pub fn new(companion: UnboundedReceiver<TransportEvent>) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, companion, restored: false })
    }

    /// Map a key press to a watch button.
    ///
    /// Ctrl-C is Back, since raw mode swallows the signal.
    pub fn convert_key(key: KeyEvent) -> Option<Button> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Button::Back);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Button::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Button::Down),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Button::Select),
            KeyCode::Esc | KeyCode::Char('q') => Some(Button::Back),
            _ => None,
        }
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = self.terminal.show_cursor();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<AppEvent<Instant>>, TerminalError> {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Ok(_)) => Ok(None),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Err(TerminalError::InputClosed),
                }
            }

            // Companion outcomes
            Some(event) = self.companion.recv() => Ok(Some(AppEvent::Transport(event))),

            // Watchdog deadline
            () = deadline => Ok(None),
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn render(&mut self, screen: &Screen) -> Result<(), TerminalError> {
        self.terminal.draw(|frame| {
            ui::render(frame, screen);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}
