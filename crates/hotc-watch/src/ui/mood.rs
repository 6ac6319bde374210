//! Mood face
//!
//! Stands in for the ten emotion images: a text face, a level bar and the
//! index.

use hotc_app::Screen;
use hotc_core::MoodIndex;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const FACES: [&str; MoodIndex::COUNT] = [
    "(T_T)", "(;_;)", "(-_-)", "(._.)", "(-.-)", "(o_o)", "(^_^)", "(^o^)", "(*^_^*)", "\\(^o^)/",
];

const LEVEL_FILLED: char = '#';
const LEVEL_EMPTY: char = '.';

/// Text face standing in for the emotion image of `mood`.
pub fn face(mood: MoodIndex) -> &'static str {
    FACES.get(usize::from(mood.get())).copied().unwrap_or("(?_?)")
}

fn level_bar(mood: MoodIndex) -> String {
    (0..=MoodIndex::MAX.get())
        .map(|i| if i <= mood.get() { LEVEL_FILLED } else { LEVEL_EMPTY })
        .collect()
}

fn face_color(mood: MoodIndex) -> Color {
    match mood.get() {
        0..=2 => Color::Blue,
        3..=6 => Color::Yellow,
        _ => Color::Green,
    }
}

/// Render the mood panel.
pub fn render(frame: &mut Frame, screen: &Screen, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Mood ");

    let lines = screen.mood().map_or_else(Vec::new, |mood| {
        vec![
            Line::default(),
            Line::from(Span::styled(
                face(mood),
                Style::default().fg(face_color(mood)).add_modifier(Modifier::BOLD),
            )),
            Line::from(level_bar(mood)),
            Line::from(Span::styled(
                format!("{}/{}", mood.get(), MoodIndex::MAX.get()),
                Style::default().fg(Color::DarkGray),
            )),
        ]
    });

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);

    frame.render_widget(paragraph, area);
}
