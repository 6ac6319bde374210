//! Display that remembers everything it was asked to show.

use hotc_core::{ResourceId, StatusDisplay};

/// [`StatusDisplay`] recording every status text and icon in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingDisplay {
    texts: Vec<String>,
    icons: Vec<ResourceId>,
}

impl RecordingDisplay {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Status text currently shown.
    pub fn status(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }

    /// Icon currently shown.
    pub fn icon(&self) -> Option<ResourceId> {
        self.icons.last().copied()
    }

    /// Every status text, oldest first.
    pub fn history(&self) -> &[String] {
        &self.texts
    }

    /// Number of times `text` was shown.
    pub fn count(&self, text: &str) -> usize {
        self.texts.iter().filter(|t| *t == text).count()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn set_status_text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn set_mood_icon(&mut self, icon: ResourceId) {
        self.icons.push(icon);
    }
}
