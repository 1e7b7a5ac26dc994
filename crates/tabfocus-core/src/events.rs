//! Outbound events pushed to any listening presentation layer.
//!
//! Events travel over a tokio broadcast channel, fire-and-forget: when no
//! listener is attached, delivery is simply dropped. Completion state that
//! must outlive an absent listener goes to the persistent store instead.

use serde::{Deserialize, Serialize};

use crate::origin::Origin;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// `MM:SS` display update, emitted on every tick and state change.
    #[serde(rename_all = "camelCase")]
    TimerTick {
        timer: String,
        remaining_seconds: u64,
    },
    /// A work session started with enforcement anchored to `origin`.
    SessionStarted { origin: Origin, reason: String },
    /// The countdown was paused, remaining time retained.
    SessionStopped,
    TimerReset,
    BreakStarted,
    /// A phase ran to completion. `message` embeds the saved reason for
    /// work completions when one exists.
    #[serde(rename_all = "camelCase")]
    PhaseComplete {
        is_break_complete: bool,
        message: String,
    },
    /// The user moved to another saved origin; enforcement re-anchored.
    FocusReanchored { origin: Origin },
    /// The active tab drifted outside the allowed set and was forced back.
    FocusViolation { origin: Origin, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_by_type() {
        let json = serde_json::to_value(Event::TimerTick {
            timer: "24:59".to_string(),
            remaining_seconds: 1499,
        })
        .unwrap();
        assert_eq!(json["type"], "timerTick");
        assert_eq!(json["timer"], "24:59");
        assert_eq!(json["remainingSeconds"], 1499);

        let json = serde_json::to_value(Event::PhaseComplete {
            is_break_complete: true,
            message: "Break complete.".to_string(),
        })
        .unwrap();
        assert_eq!(json["isBreakComplete"], true);
    }
}
