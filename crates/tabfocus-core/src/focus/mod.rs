//! Focus enforcement: the session record and the polling monitor that keeps
//! the user inside the allowed set while a work phase runs.

mod enforcer;
mod session;

pub use enforcer::FocusEnforcer;
pub use session::{FocusSession, SharedSession};
