//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: picker state machine
//! - [`Driver`]: platform-specific input and rendering
//! - [`Storage`]: where the mood survives between runs

use hotc_core::{Environment, Storage, Transport};

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment (clock)
/// - `T`: Outbound transport
/// - `S`: Persistent storage
pub struct Runtime<D, E, T, S>
where
    D: Driver,
    E: Environment,
    T: Transport,
    S: Storage,
{
    driver: D,
    app: App<E, T>,
    storage: S,
}

impl<D, E, T, S> Runtime<D, E, T, S>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    T: Transport,
    S: Storage,
{
    /// Create a new runtime around a not yet started app.
    pub fn new(driver: D, app: App<E, T>, storage: S) -> Self {
        Self { driver, app, storage }
    }

    /// Run until the app quits.
    ///
    /// 1. Start the app (loads the mood) and render
    /// 2. Poll the driver, bounded by the next watchdog deadline
    /// 3. Feed the event and a tick to the app, execute the actions
    /// 4. On quit, persist the mood and stop the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. The mood is
    /// still persisted.
    pub async fn run(mut self) -> Result<Self, D::Error> {
        let result = self.event_loop().await;

        self.app.shutdown(&self.storage);
        self.driver.stop();

        result.map(|()| self)
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        let actions = self.app.start(&self.storage);
        if self.process_actions(actions)? {
            return Ok(());
        }

        loop {
            if self.process_cycle().await? {
                return Ok(());
            }
        }
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let timeout = self.app.next_deadline();

        if let Some(event) = self.driver.poll_event(timeout).await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let actions = self.app.handle(AppEvent::Tick { now });
        self.process_actions(actions)
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(self.app.screen())?,
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<E, T> {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App<E, T> {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a reference to the Storage
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
