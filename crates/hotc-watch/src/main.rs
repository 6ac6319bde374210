//! Mood picker watch binary.
//!
//! # Usage
//!
//! ```bash
//! # Reliable companion, mood kept in ./hotc-watch.redb
//! hotc-watch
//!
//! # Flaky companion, reproducible
//! hotc-watch --loss-rate 0.3 --failure-rate 0.2 --seed 7 --log-level debug
//! ```

use std::{fs::File, sync::Mutex};

use clap::Parser;
use hotc_app::{App, Runtime};
use hotc_watch::{Companion, RedbStorage, SystemEnv, TerminalDriver, WatchArgs};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = WatchArgs::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let log_file = File::create(&args.log_file)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, db = %args.db.display(), "hotc-watch starting");

    let storage = RedbStorage::open(&args.db)?;
    let (transport, outcomes, companion) = Companion::spawn(args.companion_config(), seed);
    let driver = TerminalDriver::new(outcomes)?;
    let app = App::new(SystemEnv::new(), transport, args.lifecycle_config());

    let result = Runtime::new(driver, app, storage).run().await;
    companion.abort();

    match result {
        Ok(_) => {
            tracing::info!("hotc-watch stopped");
            Ok(())
        },
        Err(e) => {
            tracing::error!(error = %e, "terminal driver failed");
            Err(e.into())
        },
    }
}
