//! Cooperative auto-refresh scheduling.
//!
//! A countdown state machine with a pure [`state::AutoRefreshScheduler::tick`]
//! transition, driven by one recurring timer loop in
//! [`runner::SchedulerHandle::run`]. No ad hoc timer chains: the tick
//! outcome alone decides the next delay.

pub mod runner;
pub mod state;

pub use runner::SchedulerHandle;
pub use state::{AutoRefreshScheduler, Phase, Tick, COUNTDOWN_START, RECHECK_INTERVAL, TICK_INTERVAL};
