//! Timed, correlated units of work.

use crate::event_log::{merge_meta, Action, Event, EventLog, Level};
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Instant;
use uuid::Uuid;

/// A timed span over a unit of work.
///
/// Created by [`EventLog::begin`]; emits one `start` event immediately,
/// zero or more `step` events, and exactly one terminal event via
/// [`Span::end`]. Every derived record carries the same correlation id.
pub struct Span {
    log: EventLog,
    kind: String,
    label: String,
    correlation_id: String,
    started: Instant,
}

impl Span {
    pub(crate) fn start(log: EventLog, kind: &str, label: &str, meta: Value) -> Self {
        let correlation_id = new_correlation_id(kind);
        let label = if label.is_empty() {
            format!("{kind} started")
        } else {
            label.to_string()
        };
        log.event(
            Event::new(kind, Action::Start)
                .message(label.clone())
                .meta(merge_meta(meta, json!({"corr": correlation_id}))),
        );
        Self {
            log,
            kind: kind.to_string(),
            label,
            correlation_id,
            started: Instant::now(),
        }
    }

    /// The correlation id shared by every event this span emits.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Milliseconds elapsed since the span began.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Emit an intermediate event carrying the duration so far.
    pub fn step(&self, action: Action, message: &str, extra: Value) {
        let meta = merge_meta(
            merge_meta(json!({"dur": self.elapsed_ms()}), extra),
            json!({"corr": self.correlation_id}),
        );
        self.log.event(
            Event::new(self.kind.as_str(), action)
                .message(message)
                .meta(meta),
        );
    }

    /// Emit the terminal event with the elapsed duration.
    pub fn end(self, ok: bool, extra: Value) {
        let (action, level, outcome) = if ok {
            (Action::Success, Level::Info, "completed")
        } else {
            (Action::Error, Level::Error, "failed")
        };
        let meta = merge_meta(
            merge_meta(json!({"dur": self.elapsed_ms()}), extra),
            json!({"corr": self.correlation_id}),
        );
        self.log.event(
            Event::new(self.kind.as_str(), action)
                .message(format!("{} {}", self.label, outcome))
                .level(level)
                .meta(meta),
        );
    }
}

/// Correlation id: `{kind}-{timestamp_ms}-{5-char random suffix}`.
fn new_correlation_id(kind: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string()[..5].to_string();
    format!("{}-{}-{}", kind, Utc::now().timestamp_millis(), suffix)
}
