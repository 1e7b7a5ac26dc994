//! Deterministic in-process browser host.
//!
//! Drives the enforcement loop without a real browser: tests and the CLI
//! demo script tab activity against it and inspect what the core forced in
//! response (restorations, warnings, style toggles).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::browser::{BrowserHost, TabId, TabInfo};
use crate::error::BrowserError;

#[derive(Debug, Default)]
struct SimState {
    tabs: BTreeMap<i64, String>,
    active: Option<i64>,
    next_id: i64,
    restorations: Vec<(TabId, String)>,
    warnings: Vec<(TabId, String)>,
    style_override: bool,
    fail_lookups: bool,
}

/// Scriptable [`BrowserHost`] implementation.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBrowser {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a tab at `url` and make it the active one.
    pub fn open_and_activate(&self, url: &str) -> TabInfo {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.tabs.insert(id, url.to_string());
        state.active = Some(id);
        TabInfo {
            id: TabId(id),
            url: url.to_string(),
        }
    }

    /// Switch the active tab. Unknown ids are ignored.
    pub fn activate(&self, tab: TabId) {
        let mut state = self.state();
        if state.tabs.contains_key(&tab.0) {
            state.active = Some(tab.0);
        }
    }

    /// Change a tab's URL in place (in-page navigation, no switch event).
    pub fn navigate(&self, tab: TabId, url: &str) {
        let mut state = self.state();
        if let Some(entry) = state.tabs.get_mut(&tab.0) {
            *entry = url.to_string();
        }
    }

    /// Make `active_tab` fail until reset, simulating a closed window or a
    /// permission error.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.state().fail_lookups = fail;
    }

    /// Every forced navigation the core issued, in order.
    pub fn restorations(&self) -> Vec<(TabId, String)> {
        self.state().restorations.clone()
    }

    /// Every warning the core rendered, in order.
    pub fn warnings(&self) -> Vec<(TabId, String)> {
        self.state().warnings.clone()
    }

    pub fn style_override(&self) -> bool {
        self.state().style_override
    }

    pub fn tab_url(&self, tab: TabId) -> Option<String> {
        self.state().tabs.get(&tab.0).cloned()
    }
}

#[async_trait]
impl BrowserHost for SimulatedBrowser {
    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError> {
        let state = self.state();
        if state.fail_lookups {
            return Err(BrowserError::TabLookup("simulated failure".to_string()));
        }
        Ok(state.active.map(|id| TabInfo {
            id: TabId(id),
            url: state.tabs.get(&id).cloned().unwrap_or_default(),
        }))
    }

    async fn restore_tab(&self, tab: TabId, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state();
        if !state.tabs.contains_key(&tab.0) {
            return Err(BrowserError::Navigation {
                tab_id: tab.0,
                message: "tab closed".to_string(),
            });
        }
        state.tabs.insert(tab.0, url.to_string());
        state.active = Some(tab.0);
        state.restorations.push((tab, url.to_string()));
        Ok(())
    }

    async fn open_tab(&self, url: &str) -> Result<TabInfo, BrowserError> {
        Ok(self.open_and_activate(url))
    }

    async fn show_warning(&self, tab: TabId, message: &str) -> Result<(), BrowserError> {
        self.state().warnings.push((tab, message.to_string()));
        Ok(())
    }

    async fn set_style_override(&self, enabled: bool) -> Result<(), BrowserError> {
        self.state().style_override = enabled;
        Ok(())
    }
}
