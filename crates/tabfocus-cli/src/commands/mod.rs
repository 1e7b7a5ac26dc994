pub mod config;
pub mod origins;
pub mod overlay;
pub mod session;
