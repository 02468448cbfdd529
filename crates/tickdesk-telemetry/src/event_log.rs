//! Application-facing event log.
//!
//! Append-only, capacity-bounded record store with level/source/symbol/query
//! filtering, a deduplication window for repeated reports, and the compact
//! status line policy. Timed spans are in [`crate::span`].
//!
//! The log is shared as a cheap clone-able handle; all state lives behind
//! the inner `Arc`.

use crate::metrics::{DEDUPE_SUPPRESSED_TOTAL, EVENTS_TOTAL, STATUS_UPDATES_TOTAL};
use crate::span::Span;
use crate::status::{clamp, strip_endpoints, STATUS_MAX_CHARS};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default record store capacity.
pub const DEFAULT_CAPACITY: usize = 2000;

/// Metadata `type` values allowed to reach the status line.
const STATUS_KINDS: [&str; 4] = ["refresh", "network", "ui", "calc"];
/// Metadata `action` values allowed to reach the status line.
const STATUS_ACTIONS: [&str; 4] = ["start", "update", "success", "note"];

/// Record severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event action; determines the default level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Success,
    Update,
    #[default]
    Note,
    Warn,
    Error,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Success => "success",
            Self::Update => "update",
            Self::Note => "note",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Level implied by the action when none is given explicitly.
    pub fn default_level(&self) -> Level {
        match self {
            Self::Start | Self::Success | Self::Update | Self::Note => Level::Info,
            Self::Warn => Level::Warn,
            Self::Error => Level::Error,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured event to append.
///
/// `kind` and `action` are merged into the record's metadata; a missing
/// message is synthesized as `"{kind}.{action}"`.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: String,
    pub action: Action,
    pub message: Option<String>,
    pub level: Option<Level>,
    pub meta: Value,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            kind: "app".to_string(),
            action: Action::Note,
            message: None,
            level: None,
            meta: Value::Null,
        }
    }
}

impl Event {
    pub fn new(kind: impl Into<String>, action: Action) -> Self {
        Self {
            kind: kind.into(),
            action,
            ..Self::default()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }
}

/// An immutable log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub source: String,
    pub symbol: Option<String>,
    pub metadata: Value,
}

impl LogRecord {
    fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Whether this record may update the compact status line.
    ///
    /// Both the metadata `type` and `action` must be allow-listed, the
    /// level must not be ERROR, and the record must not be marked
    /// `no_status`.
    fn updates_status(&self) -> bool {
        let kind_allowed = self
            .meta_str("type")
            .map(|t| STATUS_KINDS.contains(&t))
            .unwrap_or(false);
        let action_allowed = self
            .meta_str("action")
            .map(|a| STATUS_ACTIONS.contains(&a))
            .unwrap_or(false);
        let suppressed = self
            .metadata
            .get("no_status")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        kind_allowed
            && action_allowed
            && self.level != Level::Error
            && !suppressed
            && !self.message.is_empty()
    }
}

/// Active view filters. Filtering never mutates stored records.
#[derive(Debug, Clone, Default)]
struct LogFilters {
    level: Option<Level>,
    query: String,
    source: Option<String>,
    symbol: Option<String>,
}

impl LogFilters {
    fn matches(&self, record: &LogRecord) -> bool {
        if let Some(level) = self.level {
            if record.level != level {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if &record.source != source {
                return false;
            }
        }
        if let Some(symbol) = &self.symbol {
            if record.symbol.as_deref() != Some(symbol.as_str()) {
                return false;
            }
        }
        if !self.query.is_empty() {
            let blob = format!("{} {}", record.message, record.metadata).to_lowercase();
            if !blob.contains(&self.query) {
                return false;
            }
        }
        true
    }
}

struct LogStore {
    items: VecDeque<Arc<LogRecord>>,
    seq: u64,
}

struct StatusLine {
    level: Level,
    text: String,
}

struct LogShared {
    capacity: usize,
    store: RwLock<LogStore>,
    filters: RwLock<LogFilters>,
    dedupe: Mutex<HashMap<String, DateTime<Utc>>>,
    status: RwLock<Option<StatusLine>>,
    revision: AtomicU64,
}

/// Handle to the shared event log.
#[derive(Clone)]
pub struct EventLog {
    shared: Arc<LogShared>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    /// Create a log bounded to `capacity` records (FIFO eviction).
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(LogShared {
                capacity: capacity.max(1),
                store: RwLock::new(LogStore {
                    items: VecDeque::new(),
                    seq: 0,
                }),
                filters: RwLock::new(LogFilters::default()),
                dedupe: Mutex::new(HashMap::new()),
                status: RwLock::new(None),
                revision: AtomicU64::new(0),
            }),
        }
    }

    // === Appending ===

    pub fn info(&self, message: &str, meta: Value) {
        self.write(Level::Info, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Value) {
        self.write(Level::Warn, message, meta);
    }

    pub fn error(&self, message: &str, meta: Value) {
        self.write(Level::Error, message, meta);
    }

    /// Append a structured event.
    pub fn event(&self, event: Event) {
        let level = event.level.unwrap_or_else(|| event.action.default_level());
        let message = event
            .message
            .unwrap_or_else(|| format!("{}.{}", event.kind, event.action));
        let meta = tagged_meta(&event.kind, event.action, event.meta);
        self.write(level, &message, meta);
    }

    /// Start a timed, correlated unit of work.
    pub fn begin(&self, kind: &str, label: &str, meta: Value) -> Span {
        Span::start(self.clone(), kind, label, meta)
    }

    fn write(&self, level: Level, message: &str, meta: Value) {
        let source = meta
            .get("src")
            .and_then(Value::as_str)
            .unwrap_or("App")
            .to_string();
        let symbol = meta
            .get("symbol")
            .and_then(Value::as_str)
            .map(str::to_string);

        let record = {
            let mut store = self.shared.store.write();
            store.seq += 1;
            let record = Arc::new(LogRecord {
                id: store.seq,
                timestamp: Utc::now(),
                level,
                message: message.to_string(),
                source,
                symbol,
                metadata: meta,
            });
            store.items.push_back(record.clone());
            while store.items.len() > self.shared.capacity {
                store.items.pop_front();
            }
            record
        };

        EVENTS_TOTAL.with_label_values(&[level.as_str()]).inc();

        if record.updates_status() {
            let text = clamp(&strip_endpoints(&record.message), STATUS_MAX_CHARS);
            *self.shared.status.write() = Some(StatusLine { level, text });
            STATUS_UPDATES_TOTAL.inc();
        }

        self.bump();
    }

    // === Deduplication ===

    /// Returns true (meaning "suppress") when `key` was registered within
    /// the last `ttl`; otherwise registers it and returns false. The expiry
    /// is refreshed on every registering call; stale entries are discovered
    /// lazily, never swept.
    pub fn dedupe(&self, key: &str, ttl: Duration) -> bool {
        self.dedupe_at(key, ttl, Utc::now())
    }

    /// Clock-injected form of [`EventLog::dedupe`].
    pub fn dedupe_at(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        let mut seen = self.shared.dedupe.lock();
        if let Some(expiry) = seen.get(key) {
            if *expiry > now {
                DEDUPE_SUPPRESSED_TOTAL.inc();
                return true;
            }
        }
        let ttl = chrono::Duration::milliseconds(ttl.as_millis() as i64);
        seen.insert(key.to_string(), now + ttl);
        false
    }

    // === Filters ===

    /// `None` means all levels.
    pub fn set_level_filter(&self, level: Option<Level>) {
        self.shared.filters.write().level = level;
        self.bump();
    }

    /// Case-insensitive substring query over message plus metadata.
    pub fn set_query(&self, query: &str) {
        self.shared.filters.write().query = query.trim().to_lowercase();
        self.bump();
    }

    /// `None` means all sources.
    pub fn set_source_filter(&self, source: Option<String>) {
        self.shared.filters.write().source = source;
        self.bump();
    }

    /// `None` means all symbols.
    pub fn set_symbol_filter(&self, symbol: Option<String>) {
        self.shared.filters.write().symbol = symbol;
        self.bump();
    }

    // === Read boundary ===

    /// The filtered, ordered record set for display.
    pub fn visible(&self) -> Vec<Arc<LogRecord>> {
        let filters = self.shared.filters.read();
        self.shared
            .store
            .read()
            .items
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect()
    }

    /// Total stored records (unfiltered).
    pub fn len(&self) -> usize {
        self.shared.store.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The compact status line, e.g. `INFO: Refresh complete`.
    pub fn status_line(&self) -> Option<String> {
        self.shared
            .status
            .read()
            .as_ref()
            .map(|s| format!("{}: {}", s.level, s.text))
    }

    /// Monotonic change counter; bumps on every append or filter change.
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::Acquire)
    }

    /// Discard all records and reset the sequence counter. Irreversible.
    pub fn clear(&self) {
        let mut store = self.shared.store.write();
        store.items.clear();
        store.seq = 0;
        drop(store);
        self.bump();
    }

    fn bump(&self) {
        self.shared.revision.fetch_add(1, Ordering::Release);
    }
}

/// Merge `{type, action}` with the caller's metadata; caller keys win.
fn tagged_meta(kind: &str, action: Action, meta: Value) -> Value {
    let mut merged = Map::new();
    merged.insert("type".to_string(), Value::String(kind.to_string()));
    merged.insert(
        "action".to_string(),
        Value::String(action.as_str().to_string()),
    );
    if let Value::Object(extra) = meta {
        for (k, v) in extra {
            merged.insert(k, v);
        }
    }
    Value::Object(merged)
}

/// Merge two metadata objects; keys of `second` win. Non-objects are
/// ignored on either side.
pub(crate) fn merge_meta(first: Value, second: Value) -> Value {
    let mut merged = match first {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(extra) = second {
        for (k, v) in extra {
            merged.insert(k, v);
        }
    }
    Value::Object(merged)
}
