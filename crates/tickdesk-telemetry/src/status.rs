//! Status line text sanitation.
//!
//! The compact status line must stay short and must not leak internal
//! endpoints; full detail stays in the record's metadata.

/// Maximum status line width in characters.
pub(crate) const STATUS_MAX_CHARS: usize = 48;

/// Remove URL-like and API-path-like tokens and collapse whitespace.
pub(crate) fn strip_endpoints(message: &str) -> String {
    message
        .split_whitespace()
        .filter(|token| !is_endpoint_token(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_endpoint_token(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("/api/")
}

/// Truncate to `max` characters, ending with an ellipsis when clipped.
pub(crate) fn clamp(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
