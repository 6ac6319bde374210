//! UI rendering
//!
//! Rendering functions that convert the [`Screen`] view model into terminal
//! output using ratatui widgets. All functions are pure (no I/O), taking
//! state and returning widget trees.

mod mood;
mod status;

use hotc_app::Screen;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

pub use mood::face;

/// Render the whole watch face.
pub fn render(frame: &mut Frame, screen: &Screen) {
    const FACE_MIN_HEIGHT: u16 = 5;
    const STATUS_HEIGHT: u16 = 3;
    const HINTS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(FACE_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(HINTS_HEIGHT),
        ])
        .split(frame.area());

    let [face_area, status_area, hints_area] = chunks.as_ref() else {
        return;
    };

    mood::render(frame, screen, *face_area);
    status::render(frame, screen, *status_area);
    status::render_hints(frame, *hints_area);
}

#[cfg(test)]
mod tests {
    use hotc_core::{MoodIndex, StatusDisplay};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn rendered(screen: &Screen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|frame| render(frame, screen)).unwrap();
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn shows_prompt_face_and_hints() {
        let mut screen = Screen::new();
        screen.set_status_text("How do you feel?");
        screen.set_mood_icon(MoodIndex::new(6).unwrap().icon());

        let text = rendered(&screen);
        assert!(text.contains("How do you feel?"));
        assert!(text.contains(face(MoodIndex::new(6).unwrap())));
        assert!(text.contains("6/9"));
        assert!(text.contains("quit"));
    }

    #[test]
    fn blank_screen_renders_without_face() {
        let text = rendered(&Screen::new());
        assert!(text.contains("Mood"));
        assert!(!text.contains("/9"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(3, 2)).unwrap();
        let mut screen = Screen::new();
        screen.set_status_text("Sending mood...");
        terminal.draw(|frame| render(frame, &screen)).unwrap();
    }
}
