//! Application state machine.
//!
//! [`App`] ties the mood store to the send lifecycle and decides what each
//! button does. It consumes [`crate::AppEvent`] inputs and produces
//! [`crate::AppAction`] instructions; the only I/O it performs goes through
//! the transport and storage handed to it.
//!
//! # Responsibilities
//!
//! - Up/Down cycle the mood and refresh the icon. No lifecycle involvement.
//! - Select confirms a send of the current mood.
//! - Ticks let the lifecycle watchdogs expire.
//! - Transport notifications are forwarded to the lifecycle.
//! - Start loads the mood, shutdown saves it.

use std::time::Duration;

use hotc_core::{
    Environment, LifecycleConfig, MoodIndex, MoodStore, SendLifecycle, StatusDisplay, Storage,
    Transport,
};

use crate::{AppAction, AppEvent, Button, Screen};

/// Mood picker state machine.
pub struct App<E: Environment, T: Transport> {
    /// Current mood selection.
    mood: MoodStore,
    /// Send lifecycle; owns the screen it reports to.
    lifecycle: SendLifecycle<E, T, Screen>,
}

impl<E, T> App<E, T>
where
    E: Environment,
    T: Transport,
{
    /// Create an app sending through `transport`.
    ///
    /// The mood is not loaded until [`App::start`].
    pub fn new(env: E, transport: T, config: LifecycleConfig) -> Self {
        Self {
            mood: MoodStore::default(),
            lifecycle: SendLifecycle::new(env, transport, Screen::new(), config),
        }
    }

    /// Load the persisted mood and show the initial face.
    pub fn start<S: Storage>(&mut self, storage: &S) -> Vec<AppAction> {
        self.mood = MoodStore::load(storage);
        self.lifecycle.show_prompt();
        self.refresh_icon();
        tracing::info!(mood = %self.mood.current(), "mood picker started");
        vec![AppAction::Render]
    }

    /// Persist the current mood.
    ///
    /// A failed write is logged and otherwise ignored; the app is exiting.
    pub fn shutdown<S: Storage>(&self, storage: &S) {
        match self.mood.save(storage) {
            Ok(()) => tracing::info!(mood = %self.mood.current(), "mood picker stopped"),
            Err(e) => tracing::error!(error = %e, "failed to persist mood"),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent<E::Instant>) -> Vec<AppAction> {
        match event {
            AppEvent::Key(button) => self.handle_button(button),
            AppEvent::Tick { now } => {
                if self.lifecycle.tick(now) {
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            AppEvent::Transport(event) => {
                self.lifecycle.handle(event);
                vec![AppAction::Render]
            },
            AppEvent::Resize(..) => vec![AppAction::Render],
        }
    }

    fn handle_button(&mut self, button: Button) -> Vec<AppAction> {
        match button {
            Button::Up => {
                self.mood.increment();
                self.refresh_icon();
                vec![AppAction::Render]
            },
            Button::Down => {
                self.mood.decrement();
                self.refresh_icon();
                vec![AppAction::Render]
            },
            Button::Select => {
                if self.lifecycle.confirm(self.mood.current()) {
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            Button::Back => vec![AppAction::Quit],
        }
    }

    fn refresh_icon(&mut self) {
        let icon = self.mood.current().icon();
        self.lifecycle.display_mut().set_mood_icon(icon);
    }

    /// Current mood.
    pub fn mood(&self) -> MoodIndex {
        self.mood.current()
    }

    /// What the watch face shows.
    pub fn screen(&self) -> &Screen {
        self.lifecycle.display()
    }

    /// Send lifecycle.
    pub fn lifecycle(&self) -> &SendLifecycle<E, T, Screen> {
        &self.lifecycle
    }

    /// Mutable send lifecycle.
    pub fn lifecycle_mut(&mut self) -> &mut SendLifecycle<E, T, Screen> {
        &mut self.lifecycle
    }

    /// How long until a watchdog needs a tick. `None` when nothing is pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.lifecycle.next_deadline(self.lifecycle.env().now())
    }
}

#[cfg(test)]
mod tests {
    use hotc_core::{MemoryStorage, OutboxTicket, ResourceId, TransportError};
    use hotc_proto::OutboxBuffer;
    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct FixedEnv;

    impl Environment for FixedEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::ZERO
        }

        fn wall_clock_secs(&self) -> u64 {
            0
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            std::future::ready(())
        }
    }

    #[derive(Default)]
    struct CountingTransport {
        sends: u64,
    }

    impl Transport for CountingTransport {
        fn outbox_begin(&mut self) -> Result<OutboxBuffer, TransportError> {
            Ok(OutboxBuffer::default())
        }

        fn outbox_send(&mut self, _buffer: OutboxBuffer) -> Result<OutboxTicket, TransportError> {
            self.sends += 1;
            Ok(OutboxTicket(self.sends))
        }
    }

    fn started() -> App<FixedEnv, CountingTransport> {
        let mut app = App::new(FixedEnv, CountingTransport::default(), LifecycleConfig::default());
        app.start(&MemoryStorage::new());
        app
    }

    #[test]
    fn start_shows_prompt_and_icon() {
        let app = started();
        assert_eq!(app.screen().status_text(), "How do you feel?");
        assert_eq!(app.screen().mood_icon(), Some(ResourceId(1)));
    }

    #[test]
    fn down_from_zero_wraps_and_updates_icon() {
        let mut app = started();
        let actions = app.handle(AppEvent::Key(Button::Down));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.mood().get(), 9);
        assert_eq!(app.screen().mood_icon(), Some(ResourceId(10)));
    }

    #[test]
    fn second_select_while_sending_does_nothing() {
        let mut app = started();
        assert_eq!(app.handle(AppEvent::Key(Button::Select)), vec![AppAction::Render]);
        assert_eq!(app.handle(AppEvent::Key(Button::Select)), vec![]);
        assert_eq!(app.lifecycle().transport().sends, 1);
    }

    #[test]
    fn back_quits() {
        let mut app = started();
        assert_eq!(app.handle(AppEvent::Key(Button::Back)), vec![AppAction::Quit]);
    }

    #[test]
    fn resize_only_rerenders() {
        let mut app = started();
        let before = app.screen().clone();

        assert_eq!(app.handle(AppEvent::Resize(120, 40)), vec![AppAction::Render]);
        assert_eq!(app.screen(), &before);
        assert_eq!(app.lifecycle().transport().sends, 0);
    }

    #[test]
    fn idle_tick_does_not_render() {
        let mut app = started();
        assert_eq!(app.handle(AppEvent::Tick { now: Duration::from_secs(60) }), vec![]);
    }

    proptest! {
        #[test]
        fn prop_icon_follows_mood(presses in prop::collection::vec(any::<bool>(), 0..50)) {
            let mut app = started();
            for up in presses {
                let button = if up { Button::Up } else { Button::Down };
                app.handle(AppEvent::Key(button));
                prop_assert_eq!(app.screen().mood(), Some(app.mood()));
            }
            prop_assert_eq!(app.lifecycle().transport().sends, 0);
        }
    }
}
