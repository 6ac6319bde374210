//! Terminal emulation of the mood picker watch.
//!
//! A thin shell over [`hotc_app::Driver`] that provides terminal input and
//! rendering, a simulated companion app and durable storage. All
//! orchestration lives in the generic [`hotc_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod companion;
pub mod storage;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use cli::WatchArgs;
pub use companion::{ChannelTransport, Companion, CompanionConfig};
pub use storage::RedbStorage;
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
