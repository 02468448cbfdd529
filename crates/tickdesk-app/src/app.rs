//! Application services and the refresh cycle.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::view::{SparkSeries, TickerPanel, ViewState};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickdesk_cache::PriceCache;
use tickdesk_core::{ReorderGate, ReorderGuard, Symbol};
use tickdesk_favorites::{FavoritesBook, FavoritesEngine};
use tickdesk_net::{MarketDataApi, RequestCoordinator};
use tickdesk_persistence::SettingsStore;
use tickdesk_scheduler::{AutoRefreshScheduler, SchedulerHandle};
use tickdesk_telemetry::metrics::REFRESH_CYCLES_TOTAL;
use tickdesk_telemetry::{Action, Event, EventLog};
use tracing::debug;

/// The assembled application.
///
/// All services are constructed once at startup and live for the process
/// duration. One cooperative control task drives the refresh cycle and
/// the scheduler; shared state is mutated only through commands.
pub struct App {
    config: AppConfig,
    log: EventLog,
    gate: ReorderGate,
    api: MarketDataApi,
    cache: PriceCache,
    scheduler: SchedulerHandle,
    settings: SettingsStore,
    pub(crate) book: Mutex<FavoritesBook>,
    pub(crate) engine: Mutex<FavoritesEngine>,
    pub(crate) symbol: Mutex<Symbol>,
    pub(crate) reorder_guard: Mutex<Option<ReorderGuard>>,
    loading: AtomicBool,
    view: Mutex<ViewState>,
}

impl App {
    /// Wire up every service and restore persisted settings.
    pub fn new(config: AppConfig) -> AppResult<Arc<Self>> {
        let log = EventLog::new(config.log_capacity);
        let gate = ReorderGate::new();

        let coordinator = RequestCoordinator::new(
            log.clone(),
            gate.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )?;
        let api = MarketDataApi::new(coordinator, config.base_url.clone());
        let cache = PriceCache::new(
            Arc::new(api.clone()),
            gate.clone(),
            Duration::from_millis(config.price_ttl_ms),
        );

        let settings = SettingsStore::new(config.settings_path.clone());
        let saved = settings.load();

        let symbol = Symbol::parse(&saved.last_symbol)
            .unwrap_or_else(|_| Symbol::parse(tickdesk_persistence::DEFAULT_SYMBOL).expect("default symbol is valid"));

        let book = FavoritesBook::restore(settings.clone(), log.clone());
        let engine = FavoritesEngine::new(log.clone(), gate.clone());
        let scheduler = SchedulerHandle::new(AutoRefreshScheduler::new(
            log.clone(),
            settings.clone(),
            gate.clone(),
        ));
        if saved.auto_refresh {
            scheduler.enable();
        }

        log.info("Application started", json!({}));

        Ok(Arc::new(Self {
            config,
            log,
            gate,
            api,
            cache,
            scheduler,
            settings,
            book: Mutex::new(book),
            engine: Mutex::new(engine),
            symbol: Mutex::new(symbol),
            reorder_guard: Mutex::new(None),
            loading: AtomicBool::new(false),
            view: Mutex::new(ViewState::default()),
        }))
    }

    // === Read boundary for the rendering layer ===

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn status_line(&self) -> Option<String> {
        self.log.status_line()
    }

    pub fn countdown_label(&self) -> String {
        self.scheduler.label()
    }

    pub fn active_symbol(&self) -> Symbol {
        self.symbol.lock().clone()
    }

    pub fn view(&self) -> ViewState {
        self.view.lock().clone()
    }

    pub(crate) fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub(crate) fn gate(&self) -> &ReorderGate {
        &self.gate
    }

    pub(crate) fn coordinator(&self) -> &RequestCoordinator {
        self.api.coordinator()
    }

    /// Recompute the favorites view from the current cache (the notify
    /// step after a favorites mutation).
    pub(crate) fn refresh_favorites_view(&self) {
        let book = self.book.lock();
        let report = self.engine.lock().recompute(book.positions(), &self.cache);
        self.view.lock().favorites = Some(report);
    }

    // === The refresh cycle ===

    /// Run one full refresh cycle.
    ///
    /// Re-entrant calls are dropped while a cycle is in progress. Any
    /// stage failure skips the remaining stages and leaves previously
    /// rendered values intact; the busy flag clears and the countdown
    /// reset applies on every exit path.
    pub async fn refresh_all(&self) {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Refresh already in progress, skipping");
            return;
        }
        self.scheduler.set_busy(true);
        self.coordinator().cancel_inflight();
        self.log.event(
            Event::new("refresh", Action::Start).message("Refresh started"),
        );

        match self.run_cycle().await {
            Ok(()) => {
                REFRESH_CYCLES_TOTAL.with_label_values(&["success"]).inc();
                self.log.event(
                    Event::new("refresh", Action::Success).message("Refresh complete"),
                );
            }
            Err(err) if err.is_suspended() => {
                // Silent: a reorder gesture pre-empted the cycle.
                REFRESH_CYCLES_TOTAL.with_label_values(&["suspended"]).inc();
            }
            Err(err) => {
                REFRESH_CYCLES_TOTAL.with_label_values(&["failure"]).inc();
                self.log.error(&err.to_string(), json!({}));
            }
        }

        self.loading.store(false, Ordering::SeqCst);
        self.scheduler.set_busy(false);
        self.scheduler.on_refresh_complete();
    }

    /// The strictly sequential stages of one cycle.
    async fn run_cycle(&self) -> AppResult<()> {
        let symbol = self.active_symbol();

        let mut needed = vec![symbol.clone()];
        for sym in self.book.lock().symbols() {
            if !needed.contains(&sym) {
                needed.push(sym);
            }
        }
        self.cache.ensure_fresh(&needed).await?;

        let stats = self.api.ticker_24h(&symbol).await?;
        let price = self.cache.price(&symbol);
        self.view.lock().ticker = Some(TickerPanel::build(symbol.clone(), price, &stats));

        tokio::time::sleep(Duration::from_millis(self.config.inter_fetch_delay_ms)).await;

        let closes = self
            .api
            .kline_closes(&symbol, &self.config.kline_interval, self.config.kline_limit)
            .await?;
        self.view.lock().spark = SparkSeries::build(closes);

        self.refresh_favorites_view();
        Ok(())
    }
}
