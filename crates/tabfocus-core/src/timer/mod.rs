//! Countdown timer for the work/break cycle.

mod engine;

pub use engine::{format_mmss, Phase, TickOutcome, TimerEngine, TimerSnapshot};
