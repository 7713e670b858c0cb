use chrono::NaiveDate;

use crate::api::{sync_window, Backend, CarrierCredentials, LinkAction, CARRIER_PAGE_SIZE};
use crate::error::{ReceiptsError, Result};
use crate::fmt::{muted, success};
use crate::linkage::{EInvoiceAccount, LinkageState, UnlinkOutcome};
use crate::reconciler::ReconciledView;
use crate::sanitize::sanitize_text;
use crate::settings::{load_settings, Theme};

use super::receipts::{load_view, render, today};
use super::{confirm, password_or_prompt, session_backend};

pub fn print_state(account: &EInvoiceAccount, theme: Theme) {
    match account.state() {
        LinkageState::Linked { username } => {
            let who = username
                .as_deref()
                .map(sanitize_text)
                .unwrap_or_else(|| "(unknown)".to_string());
            println!("E-invoice: {} as {who}", success(theme, "linked"));
        }
        LinkageState::Unlinked => println!("E-invoice: {}", muted(theme, "not linked")),
    }
}

pub fn status() -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    let account = EInvoiceAccount::fetch(&backend)?;
    print_state(&account, settings.theme);
    Ok(())
}

pub fn link(username: &str, password: Option<String>) -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    let mut account = EInvoiceAccount::fetch(&backend)?;

    let creds = CarrierCredentials {
        username: username.trim().to_string(),
        password: password_or_prompt(password, "E-invoice password")?,
    };
    let action = account.submit_credentials(&backend, &creds)?;
    match action {
        LinkAction::Create => println!("Linked Successfully!"),
        LinkAction::Edit => println!("Updated Successfully!"),
    }
    print_state(&account, settings.theme);
    Ok(())
}

pub fn unlink(yes: bool) -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    let mut account = EInvoiceAccount::fetch(&backend)?;

    let outcome = account.unlink(&backend, || {
        confirm("Are you sure you want to unlink your E-Invoice account?", yes)
    })?;
    match outcome {
        UnlinkOutcome::Unlinked => println!("Unlinked Successfully!"),
        UnlinkOutcome::Cancelled => println!("Cancelled."),
    }
    print_state(&account, settings.theme);
    Ok(())
}

/// Fetch carrier invoices for the sync window and merge them with manual receipts.
///
/// `None` means the carrier answered without a `content` list.
pub fn sync_with(backend: &dyn Backend, today: NaiveDate) -> Result<Option<(ReconciledView, usize)>> {
    let (from, to) = sync_window(today)
        .ok_or_else(|| ReceiptsError::Other(format!("No sync window for {today}")))?;
    let page = backend
        .carrier_invoices(from, to, CARRIER_PAGE_SIZE)
        .map_err(|e| e.or_message("Error syncing invoices. Did you link your account?"))?;
    let Some(invoices) = page.content else {
        return Ok(None);
    };
    let found = invoices.len();
    let view = load_view(backend, invoices, today)?;
    Ok(Some((view, found)))
}

pub fn sync() -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    match sync_with(&backend, today())? {
        Some((view, found)) => {
            render(&view, settings.theme);
            println!("{}", success(settings.theme, &format!("Synced! Found {found} invoices.")));
        }
        None => println!("No invoices found or error occurred."),
    }
    Ok(())
}
