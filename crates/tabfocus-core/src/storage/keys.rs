//! Persisted key layout.
//!
//! These names are shared with the presentation layer and with data written
//! by earlier releases; do not rename without a migration.

/// List of saved origins with their reasons.
pub const SAVED_ORIGINS: &str = "savedOrigins";

/// Global accessibility font overlay flag.
pub const ACCESSIBILITY_OVERLAY: &str = "accessibilityOverlayEnabled";

/// Whether the timer panel is visible in the presentation layer.
pub const SHOW_TIMER_UI: &str = "showTimerUI";

/// Set when a phase completes while no presentation layer is listening.
pub const PENDING_NOTIFICATION: &str = "pendingNotification";

/// Distinguishes work-complete from break-complete for a pending notification.
pub const BREAK_COMPLETED: &str = "breakCompleted";
