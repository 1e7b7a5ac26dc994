//! # Tabfocus Core Library
//!
//! Core logic for Tabfocus: a work/break countdown timer paired with focus
//! enforcement that keeps the active browser tab inside a user-approved set
//! of origins while a work session runs. The presentation layer (extension
//! popup, CLI) is a thin shell over this library.
//!
//! ## Architecture
//!
//! - [`TimerEngine`]: pure, caller-ticked countdown state machine
//! - [`OriginRegistry`]: derived view over the persistent key-value store
//! - [`FocusEnforcer`]: 1-second polling monitor behind the [`BrowserHost`]
//!   capability trait
//! - [`SessionCoordinator`]: serialized command queue driving all of the
//!   above and broadcasting [`Event`]s outward

pub mod browser;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod focus;
pub mod origin;
pub mod registry;
pub mod simulation;
pub mod storage;
pub mod timer;

pub use browser::{BrowserHost, TabId, TabInfo};
pub use config::Config;
pub use coordinator::{Command, SessionCoordinator, SessionHandle};
pub use error::{BrowserError, ConfigError, CoreError, Result, StoreError};
pub use events::Event;
pub use focus::{FocusEnforcer, FocusSession};
pub use origin::{Origin, SavedOrigin};
pub use registry::OriginRegistry;
pub use simulation::SimulatedBrowser;
pub use storage::{KvStore, MemoryStore, SqliteStore};
pub use timer::{Phase, TimerEngine, TimerSnapshot};
