use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use tabfocus_core::storage::MemoryStore;
use tabfocus_core::{Config, Event, OriginRegistry, SessionCoordinator, SimulatedBrowser};
use tokio::sync::broadcast::error::RecvError;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a short scripted session against the simulated browser host
    Demo {
        /// URL the session anchors to
        #[arg(long, default_value = "https://docs.example.com/guide")]
        url: String,
        /// Justification note shown in the completion message
        #[arg(long, default_value = "Demo: stay on the docs")]
        reason: String,
        /// Work phase length in seconds
        #[arg(long, default_value_t = 10)]
        work: u64,
        /// Navigate to this URL halfway through, to watch enforcement react
        #[arg(long)]
        drift: Option<String>,
    },
}

pub async fn run(action: SessionAction) -> Result<(), Box<dyn Error>> {
    let SessionAction::Demo {
        url,
        reason,
        work,
        drift,
    } = action;

    let store = Arc::new(MemoryStore::new());
    let registry = OriginRegistry::new(store.clone());
    registry.add(&url, &reason).await?;

    let browser = Arc::new(SimulatedBrowser::new());
    let tab = browser.open_and_activate(&url);

    let mut config = Config::load_or_default();
    config.timer.work_duration_secs = work;

    let (handle, mut events) = SessionCoordinator::spawn(store, browser.clone(), &config);
    handle.start().await;

    let state = handle.get_state().await?;
    if !state.running {
        return Err("session did not start".into());
    }
    println!("Session anchored to {} (tab {})", tab.origin(), tab.id);

    if let Some(drift_url) = drift {
        let browser = browser.clone();
        let delay = Duration::from_secs(work / 2);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            browser.open_and_activate(&drift_url);
        });
    }

    loop {
        match events.recv().await {
            Ok(Event::TimerTick { timer, .. }) => println!("  {timer}"),
            Ok(Event::FocusViolation { origin, message }) => {
                println!("! blocked {origin}");
                println!("  {}", message.replace('\n', "\n  "));
            }
            Ok(Event::FocusReanchored { origin }) => println!("-> re-anchored to {origin}"),
            Ok(Event::PhaseComplete { message, .. }) => {
                println!("{message}");
                break;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}
