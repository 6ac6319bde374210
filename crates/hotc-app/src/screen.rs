//! View model shared by every frontend.

use hotc_core::{MoodIndex, ResourceId, StatusDisplay};

/// What the watch face shows: one status line and one mood icon.
///
/// This is the display the lifecycle writes to. Frontends read it in
/// [`crate::Driver::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    status_text: String,
    mood_icon: Option<ResourceId>,
}

impl Screen {
    /// Blank screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Status line.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Icon on screen. `None` before the app has started.
    pub fn mood_icon(&self) -> Option<ResourceId> {
        self.mood_icon
    }

    /// Mood the icon stands for.
    pub fn mood(&self) -> Option<MoodIndex> {
        self.mood_icon.and_then(MoodIndex::from_icon)
    }
}

impl StatusDisplay for Screen {
    fn set_status_text(&mut self, text: &str) {
        text.clone_into(&mut self.status_text);
    }

    fn set_mood_icon(&mut self, icon: ResourceId) {
        self.mood_icon = Some(icon);
    }
}
