//! Display formatting for prices and money amounts.
//!
//! All view-facing numbers go through these helpers: grouped thousands,
//! bounded fraction digits, and a fixed sentinel for unavailable values.

use rust_decimal::Decimal;

/// Sentinel shown for any unavailable numeric value.
pub const UNAVAILABLE: &str = "—";

/// Format a decimal with `,` thousands grouping and `min_frac..=max_frac`
/// fraction digits (rounded at `max_frac`, zero-padded to `min_frac`).
pub fn fmt_decimal(value: Decimal, min_frac: u32, max_frac: u32) -> String {
    let rounded = value.round_dp(max_frac).normalize();
    let text = rounded.abs().to_string();
    let (int_part, mut frac) = match text.find('.') {
        Some(pos) => (text[..pos].to_string(), text[pos + 1..].to_string()),
        None => (text, String::new()),
    };
    while (frac.len() as u32) < min_frac {
        frac.push('0');
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let grouped = group_thousands(&int_part);
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Format an optional value, falling back to the sentinel.
pub fn fmt_opt(value: Option<Decimal>, min_frac: u32, max_frac: u32) -> String {
    value
        .map(|v| fmt_decimal(v, min_frac, max_frac))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Format a USD amount: `$1,234.56`, `-$25.00`.
pub fn fmt_usd(value: Decimal) -> String {
    let unsigned = fmt_decimal(value.abs(), 2, 8);
    if value.is_sign_negative() && !value.round_dp(8).is_zero() {
        format!("-${unsigned}")
    } else {
        format!("${unsigned}")
    }
}

/// Format with an explicit `+` for non-negative values.
pub fn fmt_signed(value: Decimal, min_frac: u32, max_frac: u32) -> String {
    if value.is_sign_negative() {
        fmt_decimal(value, min_frac, max_frac)
    } else {
        format!("+{}", fmt_decimal(value, min_frac, max_frac))
    }
}

/// Signed USD amount: `+$160.00`, `-$10.00`.
pub fn fmt_signed_usd(value: Decimal) -> String {
    if value.is_sign_negative() {
        fmt_usd(value)
    } else {
        format!("+{}", fmt_usd(value))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset % 3 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
