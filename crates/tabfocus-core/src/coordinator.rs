//! Session coordinator: the single control surface over the timer engine
//! and the focus enforcer.
//!
//! Commands arrive over a single-consumer queue and are processed strictly
//! in arrival order, one at a time -- a `start` can never double-execute
//! its side effects, and no two handlers race over the timer state. The
//! internal 1-second ticker feeds the same queue, so timer ticks serialize
//! with commands as well.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::browser::BrowserHost;
use crate::config::Config;
use crate::error::CoreError;
use crate::events::Event;
use crate::focus::{FocusEnforcer, FocusSession, SharedSession};
use crate::origin::Origin;
use crate::registry::OriginRegistry;
use crate::storage::{keys, set_typed, KvStore};
use crate::timer::{format_mmss, Phase, TickOutcome, TimerEngine, TimerSnapshot};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const EVENT_CHANNEL_CAPACITY: usize = 64;
const COMMAND_QUEUE_CAPACITY: usize = 32;

/// Commands accepted from the presentation layer.
#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    Reset,
    StartBreak,
    SkipBreak,
    GetState(oneshot::Sender<TimerSnapshot>),
    OpenSavedOrigin { origin: Origin },
    SetAccessibilityOverlay { enabled: bool },
}

enum Msg {
    Command(Command),
    Tick,
}

/// Cloneable client side of the command queue.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Msg>,
}

impl SessionHandle {
    pub async fn start(&self) {
        self.send(Command::Start).await;
    }

    pub async fn stop(&self) {
        self.send(Command::Stop).await;
    }

    pub async fn reset(&self) {
        self.send(Command::Reset).await;
    }

    pub async fn start_break(&self) {
        self.send(Command::StartBreak).await;
    }

    pub async fn skip_break(&self) {
        self.send(Command::SkipBreak).await;
    }

    /// Synchronous query for `{remainingSeconds, running, phase}`.
    pub async fn get_state(&self) -> Result<TimerSnapshot, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::GetState(reply)).await;
        rx.await
            .map_err(|_| CoreError::Custom("session coordinator stopped".to_string()))
    }

    /// Open a new tab at `origin`; an active work session re-anchors to it.
    pub async fn open_saved_origin(&self, origin: Origin) {
        self.send(Command::OpenSavedOrigin { origin }).await;
    }

    /// Toggle the accessibility overlay collaborator.
    pub async fn set_accessibility_overlay(&self, enabled: bool) {
        self.send(Command::SetAccessibilityOverlay { enabled }).await;
    }

    async fn send(&self, command: Command) {
        let _ = self.tx.send(Msg::Command(command)).await;
    }
}

/// Owns all mutable session state. Runs as a single task consuming the
/// command queue; dropped (and fully torn down) when the last
/// [`SessionHandle`] goes away.
pub struct SessionCoordinator {
    engine: TimerEngine,
    registry: OriginRegistry,
    store: Arc<dyn KvStore>,
    browser: Arc<dyn BrowserHost>,
    session: SharedSession,
    enforcer: FocusEnforcer,
    events: broadcast::Sender<Event>,
    ticker: Option<JoinHandle<()>>,
    tick_tx: mpsc::Sender<Msg>,
}

impl SessionCoordinator {
    /// Spawn the coordinator task. Returns the command handle and an event
    /// subscription; further subscriptions come from `events()` on the
    /// receiver's channel via `resubscribe`.
    pub fn spawn(
        store: Arc<dyn KvStore>,
        browser: Arc<dyn BrowserHost>,
        config: &Config,
    ) -> (SessionHandle, broadcast::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (events, events_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let registry = OriginRegistry::new(store.clone());
        let session: SharedSession = Arc::new(Mutex::new(None));
        let enforcer = FocusEnforcer::new(
            registry.clone(),
            browser.clone(),
            session.clone(),
            events.clone(),
            config.enforcer.warning_delay(),
        );
        let coordinator = SessionCoordinator {
            engine: TimerEngine::new(
                config.timer.work_duration_secs,
                config.timer.break_duration_secs,
            ),
            registry,
            store,
            browser,
            session,
            enforcer,
            events,
            ticker: None,
            tick_tx: tx.clone(),
        };
        tokio::spawn(coordinator.run(rx));
        (SessionHandle { tx }, events_rx)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Msg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Msg::Command(command) => self.handle(command).await,
                Msg::Tick => self.on_tick().await,
            }
        }
        self.halt_tasks().await;
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Start => self.on_start().await,
            Command::Stop => self.on_stop().await,
            Command::Reset | Command::SkipBreak => self.on_reset().await,
            Command::StartBreak => self.on_start_break().await,
            Command::GetState(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::OpenSavedOrigin { origin } => self.on_open_saved(origin).await,
            Command::SetAccessibilityOverlay { enabled } => self.on_set_overlay(enabled).await,
        }
    }

    async fn on_start(&mut self) {
        if self.engine.is_running() {
            return;
        }
        if self.engine.phase() == Phase::Work {
            // The UI gates the affordance on saved/reason state; re-validate
            // anyway and reject silently on any miss.
            let tab = match self.browser.active_tab().await {
                Ok(Some(tab)) => tab,
                Ok(None) => {
                    info!("start rejected: no active tab");
                    return;
                }
                Err(err) => {
                    warn!("start rejected: active tab lookup failed: {err}");
                    return;
                }
            };
            let origin = tab.origin();
            let saved = match self.registry.find_eligible_for_start(&origin).await {
                Ok(Some(saved)) => saved,
                Ok(None) => {
                    info!("start rejected: {origin} not saved or has no reason");
                    return;
                }
                Err(err) => {
                    warn!("start aborted: store unavailable: {err}");
                    return;
                }
            };
            *self.session.lock().await = Some(FocusSession::new(&tab, &saved));
            self.engine.start();
            self.spawn_ticker();
            self.enforcer.activate();
            let _ = self.events.send(Event::SessionStarted {
                origin: saved.origin,
                reason: saved.reason,
            });
        } else {
            // Resuming a paused break: countdown only, no enforcement.
            self.engine.start();
            self.spawn_ticker();
        }
        self.emit_display();
    }

    async fn on_stop(&mut self) {
        // Pause semantics: remaining time is retained.
        if !self.engine.stop() {
            return;
        }
        self.halt_tasks().await;
        let _ = self.events.send(Event::SessionStopped);
        self.emit_display();
    }

    async fn on_reset(&mut self) {
        self.halt_tasks().await;
        self.engine.reset();
        let _ = self.events.send(Event::TimerReset);
        self.emit_display();
    }

    async fn on_start_break(&mut self) {
        // Enforcement stays idle for the whole break.
        self.halt_tasks().await;
        self.engine.start_break();
        self.spawn_ticker();
        let _ = self.events.send(Event::BreakStarted);
        self.emit_display();
    }

    async fn on_tick(&mut self) {
        match self.engine.tick() {
            Some(TickOutcome::Tick { .. }) => self.emit_display(),
            Some(TickOutcome::WorkComplete) => {
                let reason = self
                    .session
                    .lock()
                    .await
                    .as_ref()
                    .map(|s| s.reason.clone())
                    .unwrap_or_default();
                self.halt_tasks().await;
                self.persist_completion(false).await;
                let _ = self.events.send(Event::PhaseComplete {
                    is_break_complete: false,
                    message: work_complete_message(&reason),
                });
                self.emit_display();
            }
            Some(TickOutcome::BreakComplete) => {
                self.halt_tasks().await;
                self.persist_completion(true).await;
                let _ = self.events.send(Event::PhaseComplete {
                    is_break_complete: true,
                    message: "Break complete. Back to work.".to_string(),
                });
                self.emit_display();
            }
            // Stale tick from an aborted ticker; nothing to do.
            None => {}
        }
    }

    async fn on_open_saved(&mut self, origin: Origin) {
        let tab = match self.browser.open_tab(origin.as_str()).await {
            Ok(tab) => tab,
            Err(err) => {
                warn!("failed to open {origin}: {err}");
                return;
            }
        };
        let reason = match self.registry.reason_for(&origin).await {
            Ok(reason) => reason,
            Err(err) => {
                warn!("reason lookup failed for {origin}: {err}");
                None
            }
        };
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_mut() {
            let reason = reason.unwrap_or_else(|| session.reason.clone());
            session.reanchor(&tab, &reason);
        }
    }

    async fn on_set_overlay(&mut self, enabled: bool) {
        if let Err(err) = set_typed(&*self.store, keys::ACCESSIBILITY_OVERLAY, &enabled).await {
            warn!("failed to persist overlay flag: {err}");
        }
        // The overlay is an external collaborator; a failure here degrades
        // silently and the toggle may revert.
        if let Err(err) = self.browser.set_style_override(enabled).await {
            warn!("overlay toggle degraded: {err}");
        }
    }

    /// Leave completion state behind for a presentation layer that may not
    /// currently be open. Best effort: the timer outcome stands either way.
    async fn persist_completion(&self, break_completed: bool) {
        if let Err(err) = set_typed(&*self.store, keys::PENDING_NOTIFICATION, &true).await {
            warn!("failed to persist pending notification: {err}");
        }
        if let Err(err) = set_typed(&*self.store, keys::BREAK_COMPLETED, &break_completed).await {
            warn!("failed to persist completion kind: {err}");
        }
    }

    /// Exactly one tick source at a time.
    fn spawn_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let tx = self.tick_tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Msg::Tick).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Tear down the tick source, the enforcement poll, and the session.
    /// Both cancellations are synchronous; nothing fires after this returns.
    async fn halt_tasks(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        self.enforcer.deactivate();
        *self.session.lock().await = None;
    }

    fn emit_display(&self) {
        let snapshot = self.engine.snapshot();
        let _ = self.events.send(Event::TimerTick {
            timer: format_mmss(snapshot.remaining_seconds),
            remaining_seconds: snapshot.remaining_seconds,
        });
    }
}

fn work_complete_message(reason: &str) -> String {
    if reason.trim().is_empty() {
        "Time's up! Take a 5 minute break.".to_string()
    } else {
        format!("\"{}\" - Time's up! Take a 5 minute break.", reason.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_message_embeds_reason() {
        assert_eq!(
            work_complete_message("Finish report"),
            "\"Finish report\" - Time's up! Take a 5 minute break."
        );
        assert!(!work_complete_message("").contains('"'));
    }
}
