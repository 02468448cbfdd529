//! Timer loop driving the countdown state machine.

use crate::state::{AutoRefreshScheduler, Phase, Tick, RECHECK_INTERVAL, TICK_INTERVAL};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cheap clone-able handle around the scheduler state.
///
/// The single control task drives [`SchedulerHandle::run`]; commands
/// mutate the state through the same handle.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<Mutex<AutoRefreshScheduler>>,
}

impl SchedulerHandle {
    pub fn new(scheduler: AutoRefreshScheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    pub fn enable(&self) {
        self.inner.lock().enable();
    }

    pub fn disable(&self) {
        self.inner.lock().disable();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().is_enabled()
    }

    pub fn set_busy(&self, busy: bool) {
        self.inner.lock().set_busy(busy);
    }

    pub fn on_refresh_complete(&self) {
        self.inner.lock().on_refresh_complete();
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase()
    }

    pub fn label(&self) -> String {
        self.inner.lock().label()
    }

    /// Drive the state machine with one recurring timer.
    ///
    /// Each iteration sleeps for the delay chosen by the previous tick,
    /// then advances the machine; a `Fire` outcome awaits the refresh
    /// action before continuing. Runs forever.
    pub async fn run<F, Fut>(&self, refresh: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()>,
    {
        debug!("Auto refresh runner started");
        let mut delay = TICK_INTERVAL;
        loop {
            tokio::time::sleep(delay).await;
            let action = self.inner.lock().tick();
            delay = match action {
                Tick::Idle | Tick::Count(_) => TICK_INTERVAL,
                Tick::Recheck => RECHECK_INTERVAL,
                Tick::Fire => {
                    refresh().await;
                    TICK_INTERVAL
                }
            };
        }
    }

    /// Test hook: run until the first `Fire`, returning the number of
    /// counting ticks observed.
    #[doc(hidden)]
    pub async fn run_until_fire(&self, max_ticks: usize) -> Option<usize> {
        let mut counts = 0;
        let mut delay = Duration::ZERO;
        for _ in 0..max_ticks {
            tokio::time::sleep(delay).await;
            let action = self.inner.lock().tick();
            delay = match action {
                Tick::Fire => return Some(counts),
                Tick::Count(_) => {
                    counts += 1;
                    TICK_INTERVAL
                }
                Tick::Idle => TICK_INTERVAL,
                Tick::Recheck => RECHECK_INTERVAL,
            };
        }
        None
    }
}
