//! Auto-refresh countdown state machine.

use serde_json::json;
use std::time::Duration;
use tickdesk_core::ReorderGate;
use tickdesk_persistence::SettingsStore;
use tickdesk_telemetry::{Action, Event, EventLog};

/// Countdown reset value in seconds.
pub const COUNTDOWN_START: u32 = 5;
/// Delay between counting ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Short re-check delay while busy or suspended; the countdown does not
/// decrement during these ticks.
pub const RECHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disabled,
    Counting(u32),
    Busy,
    Suspended,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Disabled: nothing to do until the next tick.
    Idle,
    /// Busy or suspended: re-check shortly without decrementing.
    Recheck,
    /// Countdown decremented; value after the decrement.
    Count(u32),
    /// Countdown hit zero: run the refresh action.
    Fire,
}

/// The countdown state machine.
///
/// Pure transitions; timing lives in the runner. The enabled flag is the
/// only persisted piece of state.
pub struct AutoRefreshScheduler {
    enabled: bool,
    remaining: u32,
    busy: bool,
    gate: ReorderGate,
    log: EventLog,
    store: SettingsStore,
}

impl AutoRefreshScheduler {
    pub fn new(log: EventLog, store: SettingsStore, gate: ReorderGate) -> Self {
        Self {
            enabled: false,
            remaining: COUNTDOWN_START,
            busy: false,
            gate,
            log,
            store,
        }
    }

    /// Start counting from the reset value and persist the flag.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.remaining = COUNTDOWN_START;
        self.store.set_auto_refresh(true);
        self.log.event(
            Event::new("ui", Action::Update)
                .message("Auto refresh enabled")
                .meta(json!({"no_status": true})),
        );
    }

    /// Stop counting and persist the flag.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.store.set_auto_refresh(false);
        self.log.event(
            Event::new("ui", Action::Update)
                .message("Auto refresh disabled")
                .meta(json!({"no_status": true})),
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set while a refresh cycle is running; ticks back off instead of
    /// decrementing.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn phase(&self) -> Phase {
        if !self.enabled {
            Phase::Disabled
        } else if self.gate.is_suspended() {
            Phase::Suspended
        } else if self.busy {
            Phase::Busy
        } else {
            Phase::Counting(self.remaining)
        }
    }

    /// Advance the state machine by one tick.
    pub fn tick(&mut self) -> Tick {
        if !self.enabled {
            return Tick::Idle;
        }
        if self.busy || self.gate.is_suspended() {
            return Tick::Recheck;
        }
        if self.remaining == 0 {
            self.log.info("Auto refresh triggered", json!({}));
            return Tick::Fire;
        }
        self.remaining -= 1;
        Tick::Count(self.remaining)
    }

    /// Reset the countdown after a refresh (scheduled or manual)
    /// finishes, unless disabled or suspended. Exiting suspension resets
    /// through this path rather than resuming mid-count.
    pub fn on_refresh_complete(&mut self) {
        if self.enabled && !self.gate.is_suspended() {
            self.remaining = COUNTDOWN_START;
        }
    }

    /// Human-readable countdown label.
    pub fn label(&self) -> String {
        let shown = if self.enabled {
            self.remaining
        } else {
            COUNTDOWN_START
        };
        format!("Auto refresh: {shown} s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickdesk_telemetry::Level;

    fn scheduler(gate: ReorderGate) -> (AutoRefreshScheduler, EventLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let log = EventLog::new(100);
        (
            AutoRefreshScheduler::new(log.clone(), store, gate),
            log,
            dir,
        )
    }

    #[test]
    fn test_disabled_ticks_are_idle() {
        let (mut sched, _log, _dir) = scheduler(ReorderGate::new());
        assert_eq!(sched.phase(), Phase::Disabled);
        assert_eq!(sched.tick(), Tick::Idle);
        assert_eq!(sched.tick(), Tick::Idle);
    }

    #[test]
    fn test_countdown_decreases_then_fires_once() {
        let (mut sched, _log, _dir) = scheduler(ReorderGate::new());
        sched.enable();
        assert_eq!(sched.phase(), Phase::Counting(COUNTDOWN_START));

        for expected in (0..COUNTDOWN_START).rev() {
            assert_eq!(sched.tick(), Tick::Count(expected));
        }
        assert_eq!(sched.tick(), Tick::Fire);

        sched.on_refresh_complete();
        assert_eq!(sched.phase(), Phase::Counting(COUNTDOWN_START));
    }

    #[test]
    fn test_busy_ticks_do_not_decrement() {
        let (mut sched, _log, _dir) = scheduler(ReorderGate::new());
        sched.enable();
        assert_eq!(sched.tick(), Tick::Count(4));

        sched.set_busy(true);
        assert_eq!(sched.phase(), Phase::Busy);
        assert_eq!(sched.tick(), Tick::Recheck);
        assert_eq!(sched.tick(), Tick::Recheck);

        sched.set_busy(false);
        assert_eq!(sched.tick(), Tick::Count(3));
    }

    #[test]
    fn test_suspension_pauses_and_resets_via_completion() {
        let gate = ReorderGate::new();
        let (mut sched, _log, _dir) = scheduler(gate.clone());
        sched.enable();
        sched.tick();
        sched.tick();
        assert_eq!(sched.phase(), Phase::Counting(3));

        let guard = gate.begin();
        assert_eq!(sched.phase(), Phase::Suspended);
        assert_eq!(sched.tick(), Tick::Recheck);
        // The countdown value survives suspension...
        drop(guard);
        assert_eq!(sched.phase(), Phase::Counting(3));
        // ...but a completed reorder resets to the start value instead of
        // resuming mid-count.
        sched.on_refresh_complete();
        assert_eq!(sched.phase(), Phase::Counting(COUNTDOWN_START));
    }

    #[test]
    fn test_on_refresh_complete_respects_disabled_and_suspended() {
        let gate = ReorderGate::new();
        let (mut sched, _log, _dir) = scheduler(gate.clone());
        sched.on_refresh_complete();
        assert_eq!(sched.phase(), Phase::Disabled);

        sched.enable();
        sched.tick();
        let _guard = gate.begin();
        sched.on_refresh_complete();
        drop(_guard);
        assert_eq!(sched.phase(), Phase::Counting(4));
    }

    #[test]
    fn test_enable_persists_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let log = EventLog::new(100);
        let mut sched = AutoRefreshScheduler::new(log, store.clone(), ReorderGate::new());

        sched.enable();
        assert!(store.load().auto_refresh);
        sched.disable();
        assert!(!store.load().auto_refresh);
    }

    #[test]
    fn test_enable_logs_without_status_update() {
        let (mut sched, log, _dir) = scheduler(ReorderGate::new());
        sched.enable();
        let records = log.visible();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "Auto refresh enabled");
        // Marked no_status, so the status line stays untouched.
        assert_eq!(log.status_line(), None);
    }

    #[test]
    fn test_label() {
        let (mut sched, _log, _dir) = scheduler(ReorderGate::new());
        assert_eq!(sched.label(), "Auto refresh: 5 s");
        sched.enable();
        sched.tick();
        assert_eq!(sched.label(), "Auto refresh: 4 s");
        sched.disable();
        assert_eq!(sched.label(), "Auto refresh: 5 s");
    }
}
