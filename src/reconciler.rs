use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::{value_text, DateValue, RawInvoice, RawManualReceipt, Record, SourceRecord};
use crate::sanitize::{sanitize_amount_str, sanitize_currency, sanitize_text};

pub const UNKNOWN_TITLE: &str = "Unknown";
pub const UNKNOWN_DATE: &str = "Unknown Date";

pub struct ReconciledView {
    pub records: Vec<Record>,
    pub monthly_total: f64,
}

impl ReconciledView {
    pub fn total_label(&self) -> String {
        format!("{:.2}", self.monthly_total)
    }
}

/// Coerce a backend or provider date token into a calendar date.
///
/// Accepted: `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD`, RFC 3339, naive
/// `YYYY-MM-DDTHH:MM:SS`, and RFC 2822 / HTTP dates. Timestamps keep the
/// calendar day written in their own offset. Anything else is `None`.
pub fn coerce_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(token, fmt) {
            return Some(d);
        }
    }

    if token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit()) {
        let year = token[0..4].parse().ok()?;
        let month = token[4..6].parse().ok()?;
        let day = token[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(token, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(token) {
        return Some(dt.date_naive());
    }
    None
}

impl DateValue {
    pub fn coerced(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Calendar(d) => Some(*d),
            DateValue::Provider(token) => coerce_date(token),
            DateValue::Missing => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DateValue::Calendar(d) => d.format("%Y-%m-%d").to_string(),
            DateValue::Provider(token) if !token.is_empty() && coerce_date(token).is_some() => {
                token.clone()
            }
            _ => UNKNOWN_DATE.to_string(),
        }
    }
}

fn title_or_unknown(raw: Option<&str>) -> String {
    let cleaned = raw.map(sanitize_text).unwrap_or_default();
    if cleaned.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        cleaned
    }
}

fn manual_date(raw: Option<&str>) -> DateValue {
    match raw.map(str::trim) {
        None | Some("") => DateValue::Missing,
        Some(token) => match coerce_date(token) {
            Some(d) => DateValue::Calendar(d),
            None => DateValue::Provider(sanitize_text(token)),
        },
    }
}

fn normalize_manual(r: RawManualReceipt) -> Record {
    Record {
        display_title: title_or_unknown(r.title.as_deref()),
        amount: r
            .amount
            .as_ref()
            .and_then(value_text)
            .map(|a| sanitize_amount_str(&a))
            .unwrap_or(0.0),
        currency: sanitize_currency(r.currency.as_deref().unwrap_or("")),
        occurred_on: manual_date(r.receipt_date.as_deref()),
        editable_id: r.id.as_ref().and_then(value_text).map(|id| sanitize_text(&id)),
    }
}

fn normalize_synced(inv: RawInvoice) -> Record {
    let occurred_on = match inv.invoice_date.as_ref().and_then(value_text) {
        Some(token) => DateValue::Provider(sanitize_text(&token)),
        None => DateValue::Missing,
    };
    Record {
        display_title: title_or_unknown(inv.seller_name.as_deref()),
        amount: inv
            .total_amount
            .as_ref()
            .and_then(value_text)
            .map(|a| sanitize_amount_str(&a))
            .unwrap_or(0.0),
        currency: sanitize_currency(inv.currency.as_deref().unwrap_or("")),
        occurred_on,
        editable_id: None,
    }
}

/// Turn either source shape into the common display record.
pub fn normalize(source: SourceRecord) -> Record {
    match source {
        SourceRecord::Manual(r) => normalize_manual(r),
        SourceRecord::Synced(inv) => normalize_synced(inv),
    }
}

/// Sum of amounts dated inside the calendar month containing `today`.
pub fn monthly_total(records: &[Record], today: NaiveDate) -> f64 {
    records
        .iter()
        .filter(|r| {
            r.occurred_on
                .coerced()
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .fold(0.0, |acc, r| acc + r.amount)
}

/// Merge manual receipts and synced invoices, newest first.
///
/// No deduplication: the same purchase entered by hand and synced from the
/// carrier shows up twice. Undated records keep their relative order after
/// every dated one.
pub fn reconcile(
    manual: Vec<RawManualReceipt>,
    synced: Vec<RawInvoice>,
    today: NaiveDate,
) -> ReconciledView {
    let mut keyed: Vec<(Option<NaiveDate>, Record)> = manual
        .into_iter()
        .map(SourceRecord::Manual)
        .chain(synced.into_iter().map(SourceRecord::Synced))
        .map(normalize)
        .map(|r| (r.occurred_on.coerced(), r))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let records: Vec<Record> = keyed.into_iter().map(|(_, r)| r).collect();
    let monthly_total = monthly_total(&records, today);
    ReconciledView {
        records,
        monthly_total,
    }
}
