//! Polling monitor over the active tab.
//!
//! Polling, not tab-event hooks alone: a continuously open tab can change
//! its URL without any discrete switch event (in-page navigation), so the
//! allowed-set check must re-run on a fixed interval regardless of what the
//! environment reports. Each poll reconciles the active tab against the
//! origin registry and either leaves it alone, re-anchors the session, or
//! forces the authorized tab back and warns.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::browser::BrowserHost;
use crate::error::CoreError;
use crate::events::Event;
use crate::origin::Origin;
use crate::registry::OriginRegistry;

use super::session::SharedSession;

const POLL_PERIOD: Duration = Duration::from_secs(1);

/// State machine over {Idle, Active}. Active means exactly one poll task is
/// running; activating twice never spawns a second one.
pub struct FocusEnforcer {
    registry: OriginRegistry,
    browser: Arc<dyn BrowserHost>,
    session: SharedSession,
    events: broadcast::Sender<Event>,
    warning_delay: Duration,
    poll: Option<(CancellationToken, JoinHandle<()>)>,
}

impl FocusEnforcer {
    pub fn new(
        registry: OriginRegistry,
        browser: Arc<dyn BrowserHost>,
        session: SharedSession,
        events: broadcast::Sender<Event>,
        warning_delay: Duration,
    ) -> Self {
        Self {
            registry,
            browser,
            session,
            events,
            warning_delay,
            poll: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.poll.is_some()
    }

    /// Idle -> Active. No-op when a poll task already exists.
    pub fn activate(&mut self) {
        if self.poll.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.registry.clone(),
            self.browser.clone(),
            self.session.clone(),
            self.events.clone(),
            cancel.clone(),
            self.warning_delay,
        ));
        self.poll = Some((cancel, handle));
        info!("focus enforcement active");
    }

    /// Active -> Idle. No further polls fire once this returns.
    pub fn deactivate(&mut self) {
        if let Some((cancel, handle)) = self.poll.take() {
            cancel.cancel();
            handle.abort();
            info!("focus enforcement idle");
        }
    }
}

impl Drop for FocusEnforcer {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn poll_loop(
    registry: OriginRegistry,
    browser: Arc<dyn BrowserHost>,
    session: SharedSession,
    events: broadcast::Sender<Event>,
    cancel: CancellationToken,
    warning_delay: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + POLL_PERIOD, POLL_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = poll_once(
                    &registry,
                    browser.as_ref(),
                    &session,
                    &events,
                    &cancel,
                    warning_delay,
                )
                .await
                {
                    // Closed tab, permission error, store hiccup: skip this
                    // tick, enforcement resumes on the next one.
                    debug!("enforcement poll skipped: {err}");
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

/// What one reconcile step decided to do.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    InBounds,
    Reanchored {
        origin: Origin,
    },
    Violation {
        tab: crate::browser::TabId,
        restore_url: String,
        offending: Origin,
        message: String,
    },
}

async fn poll_once(
    registry: &OriginRegistry,
    browser: &dyn BrowserHost,
    session: &SharedSession,
    events: &broadcast::Sender<Event>,
    cancel: &CancellationToken,
    warning_delay: Duration,
) -> Result<(), CoreError> {
    let Some(active) = browser.active_tab().await? else {
        return Ok(());
    };

    let verdict = {
        let mut guard = session.lock().await;
        let Some(sess) = guard.as_mut() else {
            // Session torn down between ticks.
            return Ok(());
        };
        let active_origin = active.origin();
        if active_origin == sess.origin {
            // Same origin is always in bounds, even if the entry was
            // removed from the saved set mid-session. Track URL drift so a
            // later violation restores the newest in-bounds page.
            sess.tab = active.id;
            sess.last_url = active.url.clone();
            Verdict::InBounds
        } else if let Some(reason) = registry.reason_for(&active_origin).await? {
            sess.reanchor(&active, &reason);
            Verdict::Reanchored {
                origin: active_origin,
            }
        } else {
            Verdict::Violation {
                tab: sess.tab,
                restore_url: sess.last_url.clone(),
                offending: active_origin,
                message: warning_message(&sess.reason),
            }
        }
    };

    match verdict {
        Verdict::InBounds => {}
        Verdict::Reanchored { origin } => {
            debug!("re-anchored focus session to {origin}");
            let _ = events.send(Event::FocusReanchored { origin });
        }
        Verdict::Violation {
            tab,
            restore_url,
            offending,
            message,
        } => {
            info!("enforcement violation: {offending} is outside the allowed set");
            browser.restore_tab(tab, &restore_url).await?;
            // Warning in the same tick as the forced navigation races the
            // environment's own tab-activation; let it settle first.
            tokio::select! {
                _ = tokio::time::sleep(warning_delay) => {}
                _ = cancel.cancelled() => return Ok(()),
            }
            if session.lock().await.is_none() {
                return Ok(());
            }
            browser.show_warning(tab, &message).await?;
            let _ = events.send(Event::FocusViolation {
                origin: offending,
                message,
            });
        }
    }
    Ok(())
}

/// Warning text shown on the authorized tab after a forced restore.
fn warning_message(reason: &str) -> String {
    let mut message = String::from("Please stay focused on this tab until the timer ends.");
    if !reason.trim().is_empty() {
        message.push_str("\nRemember: ");
        message.push_str(reason.trim());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_includes_reason_when_present() {
        let message = warning_message("Finish report");
        assert!(message.contains("stay focused"));
        assert!(message.contains("Remember: Finish report"));
    }

    #[test]
    fn warning_omits_empty_reason() {
        let message = warning_message("   ");
        assert!(!message.contains("Remember"));
    }
}
