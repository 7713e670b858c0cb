//! Backend boundary: the [`Backend`] trait and its HTTP implementation.
//!
//! Every request carries a URL-encoded form body (or none) and every response
//! is a status plus JSON. A 2xx status is success; anything else is turned
//! into [`ReceiptsError::Api`] with the server's `message` when it sent one.

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::ACCEPT;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use crate::error::{ReceiptsError, Result};
use crate::models::{CarrierInvoices, LinkStatus, RawManualReceipt, ReceiptForm};
use crate::sanitize::sanitize_text;

pub const CARRIER_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Logout,
    ListReceipts,
    CreateReceipt,
    EditReceipt(String),
    DeleteReceipt(String),
    EInvoiceStatus,
    LinkCreate,
    LinkEdit,
    LinkDelete,
    CarrierInvoices { from: NaiveDate, to: NaiveDate, size: u32 },
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Logout
            | Endpoint::ListReceipts
            | Endpoint::EInvoiceStatus
            | Endpoint::CarrierInvoices { .. } => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::Login => "/api/login".to_string(),
            Endpoint::Register => "/api/register".to_string(),
            Endpoint::Logout => "/api/logout".to_string(),
            Endpoint::ListReceipts => "/api/receipt".to_string(),
            Endpoint::CreateReceipt => "/api/receipt/create".to_string(),
            Endpoint::EditReceipt(id) => format!("/api/receipt/{id}/edit"),
            Endpoint::DeleteReceipt(id) => format!("/api/receipt/{id}/delete"),
            Endpoint::EInvoiceStatus => "/api/einvoice/status".to_string(),
            Endpoint::LinkCreate => "/api/einvoice_login/create".to_string(),
            Endpoint::LinkEdit => "/api/einvoice_login/edit".to_string(),
            Endpoint::LinkDelete => "/api/einvoice_login/delete".to_string(),
            Endpoint::CarrierInvoices { from, to, size } => format!(
                "/api/einvoice/carrier/invoices?from={}&to={}&size={size}",
                carrier_date(*from),
                carrier_date(*to)
            ),
        }
    }
}

/// Carrier query dates are `YYYY/MM/DD`.
pub fn carrier_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// First day of the previous month through the last day of the current one.
pub fn sync_window(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first_of_month = today.with_day(1)?;
    let from = first_of_month.checked_sub_months(Months::new(1))?;
    let to = first_of_month.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((from, to))
}

/// Receipt ids are interpolated into the path, so reject anything that could
/// change which route is hit.
pub fn check_receipt_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ReceiptsError::Validation(format!("Invalid receipt id: {id}")));
    }
    Ok(id)
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Create,
    Edit,
}

impl LinkAction {
    pub fn endpoint(self) -> Endpoint {
        match self {
            LinkAction::Create => Endpoint::LinkCreate,
            LinkAction::Edit => Endpoint::LinkEdit,
        }
    }
}

pub struct CarrierCredentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl CarrierCredentials {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("einvoice_username", self.username.clone()),
            ("einvoice_password", self.password.as_str().to_string()),
        ]
    }
}

/// Remote operations the client needs from the receipt service.
pub trait Backend {
    fn login(&self, email: &str, password: &str) -> Result<()>;
    fn register(&self, email: &str, password: &str) -> Result<()>;
    fn logout(&self) -> Result<()>;

    fn list_receipts(&self) -> Result<Vec<RawManualReceipt>>;
    fn create_receipt(&self, form: &ReceiptForm) -> Result<()>;
    fn edit_receipt(&self, id: &str, form: &ReceiptForm) -> Result<()>;
    fn delete_receipt(&self, id: &str) -> Result<()>;

    fn einvoice_status(&self) -> Result<LinkStatus>;
    fn submit_einvoice_login(&self, action: LinkAction, creds: &CarrierCredentials) -> Result<()>;
    fn delete_einvoice_login(&self) -> Result<()>;
    fn carrier_invoices(&self, from: NaiveDate, to: NaiveDate, size: u32) -> Result<CarrierInvoices>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct HttpBackend {
    base_url: String,
    client: Client,
    jar: Arc<Jar>,
    /// Every endpoint lives under `/api/`; cookies are exported for that scope.
    api_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, cookies: &[String]) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let parse = |url: String| {
            Url::parse(&url).map_err(|e| ReceiptsError::Settings(format!("Invalid server URL {url}: {e}")))
        };
        let root = parse(format!("{base_url}/"))?;
        let api_url = parse(format!("{base_url}/api/"))?;

        let jar = Arc::new(Jar::default());
        for cookie in cookies {
            jar.add_cookie_str(cookie, &root);
        }
        let client = Client::builder()
            .user_agent(concat!("receipts/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(Self {
            base_url,
            client,
            jar,
            api_url,
        })
    }

    /// Live cookies as `name=value` pairs, ready to be stored in the session file.
    pub fn cookies(&self) -> Vec<String> {
        let Some(header) = self.jar.cookies(&self.api_url) else {
            return Vec::new();
        };
        header
            .to_str()
            .unwrap_or_default()
            .split("; ")
            .filter(|pair| !pair.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn send(&self, endpoint: &Endpoint, form: Option<&[(&'static str, String)]>) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        tracing::debug!(method = %endpoint.method(), %url, "request");

        let mut req = self
            .client
            .request(endpoint.method(), &url)
            .header(ACCEPT, "application/json");
        if let Some(pairs) = form {
            req = req.form(pairs);
        }

        let resp = req.send().map_err(|e| {
            tracing::error!(%url, error = %e, "request failed");
            ReceiptsError::Transport(e.to_string())
        })?;

        let status = resp.status();
        let body = resp.text().map_err(|e| {
            tracing::error!(%url, error = %e, "failed to read response body");
            ReceiptsError::Transport(e.to_string())
        })?;

        if status.is_success() {
            Ok(body)
        } else {
            let message = error_message(&body);
            tracing::warn!(%url, status = status.as_u16(), %message, "request rejected");
            Err(ReceiptsError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn send_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let body = self.send(endpoint, None)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull `message` out of an error body, cleaned for the terminal; empty when
/// the body has none.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(sanitize_text))
        .unwrap_or_default()
}

fn credentials(email: &str, password: &str) -> Vec<(&'static str, String)> {
    vec![("email", email.to_string()), ("password", password.to_string())]
}

impl Backend for HttpBackend {
    fn login(&self, email: &str, password: &str) -> Result<()> {
        self.send(&Endpoint::Login, Some(credentials(email, password).as_slice()))?;
        Ok(())
    }

    fn register(&self, email: &str, password: &str) -> Result<()> {
        self.send(&Endpoint::Register, Some(credentials(email, password).as_slice()))?;
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        self.send(&Endpoint::Logout, None)?;
        Ok(())
    }

    fn list_receipts(&self) -> Result<Vec<RawManualReceipt>> {
        self.send_json(&Endpoint::ListReceipts)
    }

    fn create_receipt(&self, form: &ReceiptForm) -> Result<()> {
        self.send(&Endpoint::CreateReceipt, Some(form.to_pairs().as_slice()))?;
        Ok(())
    }

    fn edit_receipt(&self, id: &str, form: &ReceiptForm) -> Result<()> {
        let id = check_receipt_id(id)?;
        let mut pairs = vec![("receipt_id", id.to_string())];
        pairs.extend(form.to_pairs());
        self.send(&Endpoint::EditReceipt(id.to_string()), Some(pairs.as_slice()))?;
        Ok(())
    }

    fn delete_receipt(&self, id: &str) -> Result<()> {
        let id = check_receipt_id(id)?;
        self.send(&Endpoint::DeleteReceipt(id.to_string()), None)?;
        Ok(())
    }

    fn einvoice_status(&self) -> Result<LinkStatus> {
        self.send_json(&Endpoint::EInvoiceStatus)
    }

    fn submit_einvoice_login(&self, action: LinkAction, creds: &CarrierCredentials) -> Result<()> {
        self.send(&action.endpoint(), Some(creds.to_pairs().as_slice()))?;
        Ok(())
    }

    fn delete_einvoice_login(&self) -> Result<()> {
        self.send(&Endpoint::LinkDelete, None)?;
        Ok(())
    }

    fn carrier_invoices(&self, from: NaiveDate, to: NaiveDate, size: u32) -> Result<CarrierInvoices> {
        self.send_json(&Endpoint::CarrierInvoices { from, to, size })
    }
}

// ---------------------------------------------------------------------------
// In-memory backend for tests
// ---------------------------------------------------------------------------
