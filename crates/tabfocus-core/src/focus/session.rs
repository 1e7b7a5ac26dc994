use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::browser::{TabId, TabInfo};
use crate::origin::{Origin, SavedOrigin};

/// The anchor of an active focus session.
///
/// Exists only while the timer runs a work phase. The coordinator creates
/// and destroys it; the enforcement poll re-anchors `tab`/`origin`/`last_url`
/// when the user legitimately moves between saved origins.
#[derive(Debug, Clone)]
pub struct FocusSession {
    pub id: Uuid,
    /// The single tab the user must remain on.
    pub tab: TabId,
    /// Last origin considered in bounds.
    pub origin: Origin,
    /// Last URL seen while in bounds; violations restore navigation here,
    /// not merely to the bare origin.
    pub last_url: String,
    /// Justification shown in enforcement warnings.
    pub reason: String,
    pub started_at: DateTime<Utc>,
}

impl FocusSession {
    pub fn new(tab: &TabInfo, saved: &SavedOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            tab: tab.id,
            origin: saved.origin.clone(),
            last_url: tab.url.clone(),
            reason: saved.reason.clone(),
            started_at: Utc::now(),
        }
    }

    /// Move the anchor to a different tab, e.g. after a legitimate switch
    /// to another saved origin. `reason` is the new anchor's saved
    /// justification; warnings issued after the switch must cite it, not
    /// the one the session started with.
    pub fn reanchor(&mut self, tab: &TabInfo, reason: &str) {
        self.tab = tab.id;
        self.origin = tab.origin();
        self.last_url = tab.url.clone();
        self.reason = reason.trim().to_string();
    }
}

/// Session slot shared between the coordinator (create/destroy) and the
/// enforcement poll (read/re-anchor). Timer state is never behind this lock.
pub type SharedSession = Arc<Mutex<Option<FocusSession>>>;
