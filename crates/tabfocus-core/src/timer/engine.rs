//! Timer engine implementation.
//!
//! The engine is a pure state machine: it holds no tasks and reads no
//! clocks. The Session Coordinator owns the single 1-second tick source and
//! forwards each tick here, so the countdown cannot be double-driven.
//!
//! ## Phase transitions
//!
//! ```text
//! Work (running) --0--> Work (stopped, remaining 0)   work complete
//! Break (running) --0--> Work (stopped, full length)  break complete
//! ```
//!
//! A completed work phase stays parked at zero until a break is explicitly
//! started or a reset arrives. A completed break snaps back to a full work
//! phase on its own.

use serde::{Deserialize, Serialize};

/// The two mutually exclusive timer modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

/// Answer to a `getState` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub running: bool,
    pub phase: Phase,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown advanced by one second.
    Tick { remaining_seconds: u64 },
    /// Work phase ran out; the engine stopped, parked at zero.
    WorkComplete,
    /// Break ran out; the engine reverted to a full, stopped work phase.
    BreakComplete,
}

/// Core countdown state machine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    work_secs: u64,
    break_secs: u64,
    phase: Phase,
    remaining_secs: u64,
    running: bool,
}

impl TimerEngine {
    /// Create an engine parked at a full work phase.
    pub fn new(work_secs: u64, break_secs: u64) -> Self {
        Self {
            work_secs,
            break_secs,
            phase: Phase::Work,
            remaining_secs: work_secs,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.remaining_secs,
            running: self.running,
            phase: self.phase,
        }
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn display(&self) -> String {
        format_mmss(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) the countdown. Returns `false` when already
    /// running; callers must not spawn a second tick source in that case.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Pause the countdown, retaining remaining time. Returns `false` when
    /// not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Back to a full, stopped work phase.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining_secs = self.work_secs;
    }

    /// Switch to a full break phase and start counting.
    pub fn start_break(&mut self) {
        self.phase = Phase::Break;
        self.remaining_secs = self.break_secs;
        self.running = true;
    }

    pub fn skip_break(&mut self) {
        self.reset();
    }

    /// Advance the countdown by one second. Returns `None` when the engine
    /// is not running (stale ticks after a stop are harmless).
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.running {
            return None;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs > 0 {
                return Some(TickOutcome::Tick {
                    remaining_seconds: self.remaining_secs,
                });
            }
        }
        self.running = false;
        match self.phase {
            Phase::Work => Some(TickOutcome::WorkComplete),
            Phase::Break => {
                self.phase = Phase::Work;
                self.remaining_secs = self.work_secs;
                Some(TickOutcome::BreakComplete)
            }
        }
    }
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine(work: u64, brk: u64) -> TimerEngine {
        TimerEngine::new(work, brk)
    }

    #[test]
    fn start_is_idempotent() {
        let mut e = engine(10, 5);
        assert!(e.start());
        assert!(!e.start());
        assert!(e.is_running());
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let mut e = engine(10, 5);
        assert!(!e.stop());
        assert_eq!(
            e.snapshot(),
            TimerSnapshot {
                remaining_seconds: 10,
                running: false,
                phase: Phase::Work
            }
        );
    }

    #[test]
    fn stop_pauses_without_resetting() {
        let mut e = engine(10, 5);
        e.start();
        e.tick();
        e.tick();
        assert!(e.stop());
        assert_eq!(e.remaining_secs(), 8);
        assert_eq!(e.phase(), Phase::Work);
    }

    #[test]
    fn work_completes_after_full_duration() {
        let mut e = engine(10, 5);
        e.start();
        for n in 1..10 {
            assert_eq!(
                e.tick(),
                Some(TickOutcome::Tick {
                    remaining_seconds: 10 - n
                })
            );
        }
        assert_eq!(e.tick(), Some(TickOutcome::WorkComplete));
        assert_eq!(
            e.snapshot(),
            TimerSnapshot {
                remaining_seconds: 0,
                running: false,
                phase: Phase::Work
            }
        );
        // Parked at zero: further ticks do nothing.
        assert_eq!(e.tick(), None);
    }

    #[test]
    fn break_completion_reverts_to_full_work_phase() {
        let mut e = engine(10, 3);
        e.start_break();
        assert_eq!(e.phase(), Phase::Break);
        assert_eq!(e.remaining_secs(), 3);
        e.tick();
        e.tick();
        assert_eq!(e.tick(), Some(TickOutcome::BreakComplete));
        assert_eq!(
            e.snapshot(),
            TimerSnapshot {
                remaining_seconds: 10,
                running: false,
                phase: Phase::Work
            }
        );
    }

    #[test]
    fn reset_from_any_state_yields_full_work_phase() {
        let mut e = engine(10, 5);
        e.start_break();
        e.tick();
        e.reset();
        let expected = TimerSnapshot {
            remaining_seconds: 10,
            running: false,
            phase: Phase::Work,
        };
        assert_eq!(e.snapshot(), expected);

        e.start();
        e.tick();
        e.reset();
        assert_eq!(e.snapshot(), expected);
    }

    #[test]
    fn skip_break_matches_reset() {
        let mut a = engine(10, 5);
        let mut b = engine(10, 5);
        a.start_break();
        a.tick();
        b.start_break();
        b.tick();

        a.skip_break();
        b.reset();
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn tick_while_stopped_returns_none() {
        let mut e = engine(10, 5);
        assert_eq!(e.tick(), None);
        assert_eq!(e.remaining_secs(), 10);
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(25 * 60), "25:00");
    }

    proptest! {
        #[test]
        fn format_mmss_roundtrips(secs in 0u64..6000) {
            let text = format_mmss(secs);
            let (m, s) = text.split_once(':').unwrap();
            let back = m.parse::<u64>().unwrap() * 60 + s.parse::<u64>().unwrap();
            prop_assert_eq!(back, secs);
        }
    }
}
