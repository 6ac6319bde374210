//! Status line
//!
//! Displays the lifecycle's status text and the key bindings.

use hotc_app::Screen;
use hotc_core::StatusText;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const HINTS: &[(&str, &str)] =
    &[("↑/k", "up"), ("↓/j", "down"), ("enter", "send"), ("q", "quit")];

fn status_style(text: &str) -> Style {
    let color = if text == StatusText::Sending.as_str() {
        Color::Yellow
    } else if text == StatusText::Sent.as_str() || text == StatusText::Received.as_str() {
        Color::Green
    } else if text == StatusText::SendFailed.as_str()
        || text == StatusText::TimedOut.as_str()
        || text == StatusText::Dropped.as_str()
    {
        Color::Red
    } else {
        Color::White
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Render the status box.
pub fn render(frame: &mut Frame, screen: &Screen, area: Rect) {
    let text = screen.status_text();
    let block = Block::default().borders(Borders::ALL);

    let paragraph = Paragraph::new(Line::from(Span::styled(text, status_style(text))))
        .alignment(Alignment::Center)
        .block(block);

    frame.render_widget(paragraph, area);
}

/// Render the key binding hints.
pub fn render_hints(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::with_capacity(HINTS.len() * 2);
    for (key, action) in HINTS {
        spans.push(Span::styled(format!(" {key}"), Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" {action} ")));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_colors() {
        assert_eq!(status_style("Mood sent").fg, Some(Color::Green));
        assert_eq!(status_style("Timed out").fg, Some(Color::Red));
        assert_eq!(status_style("Sending mood...").fg, Some(Color::Yellow));
        assert_eq!(status_style("How do you feel?").fg, Some(Color::White));
    }
}
