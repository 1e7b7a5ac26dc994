//! Capability interface over the host browser environment.
//!
//! Enforcement never talks to a concrete browser API. Everything it needs
//! from the environment -- query the active tab, force a navigation, render
//! a warning -- goes through [`BrowserHost`], so the poll-and-reconcile
//! algorithm is identical regardless of the adapter behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BrowserError;
use crate::origin::Origin;

/// Opaque handle to a browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab as seen by the environment at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

impl TabInfo {
    pub fn origin(&self) -> Origin {
        Origin::normalize(&self.url)
    }
}

/// Host-environment adapter.
///
/// Implementations must tolerate being called while tabs close underneath
/// them; every method may fail and callers treat failures as skippable.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Currently active tab in the focused window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError>;

    /// Re-activate `tab` and navigate it to `url`, overriding URL drift.
    async fn restore_tab(&self, tab: TabId, url: &str) -> Result<(), BrowserError>;

    /// Open a new tab at `url` and return it.
    async fn open_tab(&self, url: &str) -> Result<TabInfo, BrowserError>;

    /// Render a blocking warning dialog inside `tab`.
    async fn show_warning(&self, tab: TabId, message: &str) -> Result<(), BrowserError>;

    /// Toggle the global accessibility style override. The overlay itself
    /// lives outside the core; this is its single entry point.
    async fn set_style_override(&self, enabled: bool) -> Result<(), BrowserError>;
}
