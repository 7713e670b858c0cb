use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// A receipt entered by hand, as returned by `GET /api/receipt`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManualReceipt {
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt_date: Option<String>,
}

/// An invoice pulled from the carrier, as returned inside `content`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInvoice {
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default)]
    pub invoice_date: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarrierInvoices {
    #[serde(default)]
    pub content: Option<Vec<RawInvoice>>,
}

#[derive(Debug, Clone)]
pub enum SourceRecord {
    Manual(RawManualReceipt),
    Synced(RawInvoice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Calendar(NaiveDate),
    /// Provider token kept verbatim for display.
    Provider(String),
    Missing,
}

/// Normalized, display-safe receipt or invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub display_title: String,
    pub amount: f64,
    pub currency: String,
    pub occurred_on: DateValue,
    pub editable_id: Option<String>,
}

impl Record {
    pub fn is_editable(&self) -> bool {
        self.editable_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkStatus {
    #[serde(default)]
    pub linked: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// Fields posted to the receipt create and edit endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptForm {
    pub title: String,
    pub amount: String,
    pub currency: String,
    pub receipt_date: String,
}

impl ReceiptForm {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("amount", self.amount.clone()),
            ("currency", self.currency.clone()),
            ("receipt_date", self.receipt_date.clone()),
        ]
    }
}

/// Render a loosely typed JSON scalar as text; `null` and empty strings yield `None`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(map) => map.get("$oid").and_then(value_text),
        _ => None,
    }
}
