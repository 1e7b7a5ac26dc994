//! Persisted presentation flags: the accessibility overlay and the timer
//! panel visibility.

use std::error::Error;

use clap::Subcommand;
use tabfocus_core::storage::{get_typed, keys, set_typed};
use tabfocus_core::SqliteStore;

#[derive(Subcommand)]
pub enum FlagAction {
    /// Turn the flag on
    On,
    /// Turn the flag off
    Off,
    /// Show the persisted value
    Status,
}

pub async fn run_overlay(action: FlagAction) -> Result<(), Box<dyn Error>> {
    toggle(keys::ACCESSIBILITY_OVERLAY, "Accessibility overlay", action).await
}

pub async fn run_timer_ui(action: FlagAction) -> Result<(), Box<dyn Error>> {
    toggle(keys::SHOW_TIMER_UI, "Timer panel", action).await
}

async fn toggle(key: &str, label: &str, action: FlagAction) -> Result<(), Box<dyn Error>> {
    let store = SqliteStore::open_default()?;

    match action {
        FlagAction::On | FlagAction::Off => {
            let enabled = matches!(action, FlagAction::On);
            set_typed(&store, key, &enabled).await?;
            println!("{label} {}", if enabled { "enabled" } else { "disabled" });
        }
        FlagAction::Status => {
            let enabled: bool = get_typed(&store, key).await?.unwrap_or(false);
            println!("{label}: {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}
