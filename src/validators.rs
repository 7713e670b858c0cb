//! Form checks that mirror the server's validation so bad input never leaves the machine.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{ReceiptsError, Result};
use crate::sanitize::{parse_amount, MAX_AMOUNT};

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    fn fail(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ReceiptsError::Validation(self.message))
        }
    }
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

pub fn validate_email(email: &str) -> Validation {
    if email.trim().is_empty() {
        return Validation::fail("Email is required");
    }
    if !email_re().is_match(email) {
        return Validation::fail("Invalid email format");
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Validation::fail("Email is too long (max 254 characters)");
    }
    Validation::ok()
}

/// At least eight characters with a lowercase letter, an uppercase letter and a digit.
pub fn validate_password(password: &str) -> Validation {
    if password.is_empty() {
        return Validation::fail("Password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Validation::fail("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Validation::fail("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Validation::fail("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Validation::fail("Password must contain at least one number");
    }
    Validation::ok()
}

pub fn validate_amount(amount: &str) -> Validation {
    if amount.is_empty() {
        return Validation::fail("Amount is required");
    }
    let value = match parse_amount(amount) {
        Some(v) if v.is_finite() => v,
        _ => return Validation::fail("Amount must be a valid number"),
    };
    if value <= 0.0 {
        return Validation::fail("Amount must be greater than 0");
    }
    if value > MAX_AMOUNT {
        return Validation::fail("Amount is too large");
    }
    Validation::ok()
}

/// `YYYY-MM-DD` that also names a real calendar day.
pub fn validate_date(date: &str) -> Validation {
    if date.trim().is_empty() {
        return Validation::fail("Date is required");
    }
    if !date_re().is_match(date) {
        return Validation::fail("Date must be in YYYY-MM-DD format");
    }
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Validation::fail("Invalid date");
    }
    Validation::ok()
}
