//! Abortable, span-wrapped JSON fetches.

use crate::error::{NetError, NetResult};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tickdesk_core::ReorderGate;
use tickdesk_telemetry::metrics::{HTTP_LATENCY_MS, HTTP_REQUESTS_TOTAL};
use tickdesk_telemetry::{Action, EventLog};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Dedupe window for repeated HTTP-status error reports.
const HTTP_ERROR_DEDUPE_TTL: Duration = Duration::from_secs(10);

/// Arrays up to this length are echoed verbatim into the log.
const ECHO_MAX_ITEMS: usize = 50;

/// Registry of cancellation tokens for in-flight calls.
#[derive(Default)]
struct InflightSet {
    tokens: DashMap<u64, CancellationToken>,
    next_id: AtomicU64,
}

impl InflightSet {
    fn register(&self, token: CancellationToken) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tokens.insert(id, token);
        id
    }

    fn retract(&self, id: u64) {
        self.tokens.remove(&id);
    }

    fn cancel_all(&self) {
        for entry in self.tokens.iter() {
            entry.value().cancel();
        }
        self.tokens.clear();
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}

struct CoordinatorShared {
    client: reqwest::Client,
    log: EventLog,
    gate: ReorderGate,
    inflight: InflightSet,
    timeout: Duration,
}

/// Wraps outbound fetches with cancellation, timeout, and log spans.
///
/// Side-effect transparent to callers beyond logging: never retries.
#[derive(Clone)]
pub struct RequestCoordinator {
    shared: Arc<CoordinatorShared>,
}

impl RequestCoordinator {
    pub fn new(log: EventLog, gate: ReorderGate, timeout: Duration) -> NetResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| NetError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            shared: Arc::new(CoordinatorShared {
                client,
                log,
                gate,
                inflight: InflightSet::default(),
                timeout,
            }),
        })
    }

    /// Fetch a URL and parse the body as JSON.
    ///
    /// Refuses immediately with [`NetError::Suspended`] while the reorder
    /// gate is held. Non-success statuses end the span as failed and log
    /// one ERROR per `status+endpoint` per 10 seconds.
    pub async fn fetch_json(&self, url: &str) -> NetResult<Value> {
        if self.shared.gate.is_suspended() {
            return Err(NetError::Suspended);
        }

        let endpoint = endpoint_label(url);
        let span = self.shared.log.begin(
            "network",
            &format!("Request {endpoint}"),
            json!({"endpoint": endpoint, "method": "GET"}),
        );

        let token = CancellationToken::new();
        let id = self.shared.inflight.register(token.clone());
        let started = Instant::now();

        let request = async {
            let response = self
                .shared
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| NetError::Transport(e.to_string()))?;
            let status = response.status();
            // Tolerate non-JSON bodies; shape metadata records them as null.
            let body = response.json::<Value>().await.ok();
            Ok::<_, NetError>((status, body))
        };

        let outcome = tokio::select! {
            res = request => res,
            _ = token.cancelled() => Err(NetError::Cancelled {
                endpoint: endpoint.clone(),
            }),
            _ = tokio::time::sleep(self.shared.timeout) => {
                token.cancel();
                Err(NetError::Timeout {
                    endpoint: endpoint.clone(),
                })
            }
        };

        self.shared.inflight.retract(id);
        HTTP_LATENCY_MS
            .with_label_values(&[&endpoint])
            .observe(started.elapsed().as_millis() as f64);

        let (status, body) = match outcome {
            Ok(pair) => pair,
            Err(err) => {
                HTTP_REQUESTS_TOTAL
                    .with_label_values(&[&endpoint, err.outcome()])
                    .inc();
                span.end(
                    false,
                    json!({"endpoint": endpoint, "error": err.to_string()}),
                );
                return Err(err);
            }
        };

        let meta = json!({
            "endpoint": endpoint,
            "status": status.as_u16(),
            "ok": status.is_success(),
            "kind": shape_kind(body.as_ref()),
            "size": shape_size(body.as_ref()),
        });
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[&endpoint, status.as_str()])
            .inc();

        if !status.is_success() {
            span.end(false, meta.clone());
            let key = format!("http-{}-{}", status.as_u16(), endpoint);
            if !self.shared.log.dedupe(&key, HTTP_ERROR_DEDUPE_TTL) {
                self.shared.log.error(
                    &format!("HTTP {}", status.as_u16()),
                    json!({
                        "src": "NET",
                        "endpoint": endpoint,
                        "status": status.as_u16(),
                    }),
                );
            }
            return Err(NetError::Status {
                status: status.as_u16(),
                endpoint,
            });
        }

        span.step(Action::Success, "Response received", meta.clone());

        let body = body.unwrap_or(Value::Null);
        if echo_worthy(&body) {
            self.shared.log.info(
                "API response",
                json!({"src": "NET", "endpoint": endpoint, "body": body.clone()}),
            );
        }

        span.end(true, meta);
        Ok(body)
    }

    /// Abort every registered in-flight call.
    ///
    /// Used when a new refresh cycle supersedes the previous one and when
    /// a reorder gesture begins.
    pub fn cancel_inflight(&self) {
        let count = self.shared.inflight.len();
        if count > 0 {
            debug!(count, "Cancelling in-flight requests");
        }
        self.shared.inflight.cancel_all();
    }

    /// Number of currently registered in-flight calls.
    pub fn inflight_len(&self) -> usize {
        self.shared.inflight.len()
    }
}

/// Derive a URL-free endpoint label for spans and dedupe keys.
fn endpoint_label(url: &str) -> String {
    if let Some(start) = url.find("/api/v3/") {
        let tail = &url[start..];
        let end = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-')))
            .unwrap_or(tail.len());
        tail[..end].to_string()
    } else {
        "request".to_string()
    }
}

fn shape_kind(body: Option<&Value>) -> &'static str {
    match body {
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
        Some(Value::String(_)) => "string",
        Some(Value::Number(_)) => "number",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Null) | None => "null",
    }
}

fn shape_size(body: Option<&Value>) -> usize {
    match body {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}

/// Small responses get echoed for diagnostic visibility: arrays of at
/// most 50 items, or non-object scalars.
fn echo_worthy(body: &Value) -> bool {
    match body {
        Value::Array(items) => items.len() <= ECHO_MAX_ITEMS,
        Value::Object(_) | Value::Null => false,
        _ => true,
    }
}
