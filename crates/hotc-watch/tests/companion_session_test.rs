//! The picker against the in-process companion and redb, without a terminal.
//!
//! Time is tokio's paused clock, so companion latency and the watchdogs
//! resolve instantly and in order.

use std::time::Duration;

use hotc_app::{App, AppEvent, Button};
use hotc_core::{Environment, LateCompletionPolicy, LifecycleConfig, MOOD_PERSIST_KEY, Storage};
use hotc_watch::{ChannelTransport, Companion, CompanionConfig, RedbStorage};
use tempfile::tempdir;
use tokio::{sync::mpsc::UnboundedReceiver, time::Instant};

/// Environment on tokio's clock, which tests can pause.
#[derive(Clone, Copy)]
struct TokioEnv;

impl Environment for TokioEnv {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock_secs(&self) -> u64 {
        1_700_000_000
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

struct Session {
    app: App<TokioEnv, ChannelTransport>,
    outcomes: UnboundedReceiver<hotc_core::TransportEvent>,
}

impl Session {
    fn start(config: CompanionConfig, lifecycle: LifecycleConfig, storage: &RedbStorage) -> Self {
        let (transport, outcomes, _task) = Companion::spawn(config, 11);
        let mut app = App::new(TokioEnv, transport, lifecycle);
        app.start(storage);
        Self { app, outcomes }
    }

    fn press(&mut self, button: Button) {
        self.app.handle(AppEvent::Key(button));
    }

    /// One driver cycle: the next companion outcome or watchdog, then a tick.
    async fn step(&mut self) {
        let deadline = self.app.next_deadline().unwrap_or(Duration::from_secs(3600));
        if let Ok(Some(event)) = tokio::time::timeout(deadline, self.outcomes.recv()).await {
            self.app.handle(AppEvent::Transport(event));
        }
        self.app.handle(AppEvent::Tick { now: Instant::now() });
    }

    fn status(&self) -> &str {
        self.app.screen().status_text()
    }
}

#[tokio::test(start_paused = true)]
async fn acknowledged_send_then_prompt() {
    let dir = tempdir().unwrap();
    let storage = RedbStorage::open(dir.path().join("watch.redb")).unwrap();
    let mut session = Session::start(CompanionConfig::default(), LifecycleConfig::default(), &storage);

    session.press(Button::Up);
    session.press(Button::Select);
    assert_eq!(session.status(), "Sending mood...");

    session.step().await;
    assert_eq!(session.status(), "Mood sent");
    session.step().await;
    assert_eq!(session.status(), "Message received");
    session.step().await;
    assert_eq!(session.status(), "How do you feel?");
    assert!(!session.app.lifecycle().is_sending());
}

#[tokio::test(start_paused = true)]
async fn silent_companion_times_out() {
    let dir = tempdir().unwrap();
    let storage = RedbStorage::open(dir.path().join("watch.redb")).unwrap();
    let config = CompanionConfig { loss_rate: 1.0, ..CompanionConfig::default() };
    let mut session = Session::start(config, LifecycleConfig::default(), &storage);

    let started = Instant::now();
    session.press(Button::Select);
    session.step().await;

    assert_eq!(session.status(), "Timed out");
    assert!(started.elapsed() >= Duration::from_secs(10));

    session.press(Button::Select);
    assert_eq!(session.status(), "Sending mood...");
}

#[tokio::test(start_paused = true)]
async fn slow_companion_after_timeout_under_both_policies() {
    let slow = CompanionConfig { latency: Duration::from_secs(12), ..CompanionConfig::default() };

    for (policy, expected) in
        [(LateCompletionPolicy::Ignore, "Timed out"), (LateCompletionPolicy::Apply, "Mood sent")]
    {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("watch.redb")).unwrap();
        let lifecycle = LifecycleConfig { late_completion: policy, ..LifecycleConfig::default() };
        let mut session = Session::start(slow.clone(), lifecycle, &storage);

        session.press(Button::Select);
        session.step().await;
        assert_eq!(session.status(), "Timed out");

        // The late OutboxSent lands 2 s later, before the 3 s reset.
        session.step().await;
        assert_eq!(session.status(), expected, "{policy:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn mood_persists_across_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("watch.redb");

    {
        let storage = RedbStorage::open(&path).unwrap();
        let mut session =
            Session::start(CompanionConfig::default(), LifecycleConfig::default(), &storage);
        for _ in 0..3 {
            session.press(Button::Down);
        }
        session.app.shutdown(&storage);
    }

    let storage = RedbStorage::open(&path).unwrap();
    assert_eq!(storage.read_int(MOOD_PERSIST_KEY), Ok(Some(7)));
    let session = Session::start(CompanionConfig::default(), LifecycleConfig::default(), &storage);
    assert_eq!(session.app.mood().get(), 7);
}
