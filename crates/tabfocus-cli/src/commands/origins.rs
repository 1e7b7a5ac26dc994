use std::error::Error;
use std::sync::Arc;

use clap::Subcommand;
use tabfocus_core::{Origin, OriginRegistry, SqliteStore};

#[derive(Subcommand)]
pub enum OriginsAction {
    /// Save the origin of a URL with a justification note
    Add {
        url: String,
        /// Why this origin belongs to your work. Required before a session
        /// can start on it.
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// List saved origins, rewriting legacy full-URL entries in place
    List,
    /// Remove a saved origin
    Remove { origin: String },
    /// Replace the reason on a saved origin
    UpdateReason { origin: String, reason: String },
}

pub async fn run(action: OriginsAction) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(SqliteStore::open_default()?);
    let registry = OriginRegistry::new(store);

    match action {
        OriginsAction::Add { url, reason } => {
            let origin = Origin::normalize(&url);
            if registry.add(&url, &reason).await? {
                println!("Saved {origin}");
            } else {
                println!("Already saved: {origin}");
            }
        }
        OriginsAction::List => {
            let list = registry.migrate().await?;
            if list.is_empty() {
                println!("No saved origins.");
                return Ok(());
            }
            for entry in list {
                if entry.has_reason() {
                    println!("{}  ({})", entry.origin, entry.reason);
                } else {
                    println!("{}  (no reason, not start-eligible)", entry.origin);
                }
            }
        }
        OriginsAction::Remove { origin } => {
            let origin = Origin::normalize(&origin);
            if registry.remove(&origin).await? {
                println!("Removed {origin}");
            } else {
                println!("Not saved: {origin}");
            }
        }
        OriginsAction::UpdateReason { origin, reason } => {
            let origin = Origin::normalize(&origin);
            if registry.update_reason(&origin, &reason).await? {
                println!("Updated reason for {origin}");
            } else {
                println!("Not saved: {origin}");
            }
        }
    }
    Ok(())
}
