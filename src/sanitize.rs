//! String and number normalization applied before anything reaches the terminal.

use std::sync::OnceLock;

use regex::Regex;

pub const MAX_AMOUNT: f64 = 999_999_999.0;
pub const DEFAULT_CURRENCY: &str = "TWD";

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn number_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid regex")
    })
}

/// Remove every HTML tag, leaving the text between them.
pub fn strip_tags(input: &str) -> String {
    tag_re().replace_all(input, "").into_owned()
}

/// Drop script blocks with their contents, then any remaining tags and
/// control characters (so no escape sequence reaches the terminal), then trim.
pub fn sanitize_text(input: &str) -> String {
    let without_scripts = script_re().replace_all(input, "");
    let printable: String = strip_tags(&without_scripts)
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    printable.trim().to_string()
}

/// Parse the longest numeric prefix of `input`, ignoring leading whitespace.
///
/// `"12.50 TWD"` parses as `12.5`; `"abc"` and `""` do not parse.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let m = number_prefix_re().find(trimmed)?;
    m.as_str().parse::<f64>().ok().or_else(|| {
        // "Infinity" is not accepted by f64::from_str in every spelling
        match m.as_str() {
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        }
    })
}

/// Clamp an amount into `[0, MAX_AMOUNT]`; NaN and infinities become 0.
pub fn sanitize_amount(amount: f64) -> f64 {
    if !amount.is_finite() || amount < 0.0 {
        return 0.0;
    }
    amount.min(MAX_AMOUNT)
}

pub fn sanitize_amount_str(input: &str) -> f64 {
    parse_amount(input).map(sanitize_amount).unwrap_or(0.0)
}

/// Uppercase, keep `A-Z` only, truncate to three letters, default to TWD.
pub fn sanitize_currency(currency: &str) -> String {
    let cleaned: String = currency
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .take(3)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        cleaned
    }
}
