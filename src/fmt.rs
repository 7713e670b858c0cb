use colored::{ColoredString, Colorize};

use crate::settings::Theme;

/// Format an amount with thousands separators and two decimals: 1,234.56
pub fn amount(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Amount followed by its currency code: 1,234.56 TWD
pub fn money(val: f64, currency: &str) -> String {
    format!("{} {currency}", amount(val))
}

// Dark terminals get the bright variants.

pub fn heading(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.bright_yellow().bold(),
        Theme::Light => text.blue().bold(),
    }
}

pub fn success(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.bright_green(),
        Theme::Light => text.green(),
    }
}

pub fn muted(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.bright_black(),
        Theme::Light => text.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(1234.56), "1,234.56");
        assert_eq!(amount(-500.00), "-500.00");
        assert_eq!(amount(0.0), "0.00");
        assert_eq!(amount(1000000.99), "1,000,000.99");
        assert_eq!(amount(42.1), "42.10");
        assert_eq!(amount(999_999_999.0), "999,999,999.00");
    }

    #[test]
    fn test_money_appends_currency() {
        assert_eq!(money(150.0, "TWD"), "150.00 TWD");
    }

    #[test]
    fn test_palette_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(heading(Theme::Dark, "Receipts").to_string(), "Receipts");
        assert_eq!(success(Theme::Light, "ok").to_string(), "ok");
        assert_eq!(muted(Theme::Light, "-").to_string(), "-");
    }
}
