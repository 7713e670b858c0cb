use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::api::Backend;
use crate::error::{ReceiptsError, Result};
use crate::fmt::{heading, money, muted, success};
use crate::models::{RawInvoice, ReceiptForm};
use crate::reconciler::{reconcile, ReconciledView};
use crate::sanitize::{sanitize_currency, sanitize_text};
use crate::settings::{load_settings, Theme};
use crate::validators::{validate_amount, validate_date};

use super::{confirm, session_backend};

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Validate raw form input and build what gets posted.
pub fn build_form(title: &str, amount: &str, currency: &str, date: &str) -> Result<ReceiptForm> {
    let title = sanitize_text(title);
    if title.is_empty() {
        return Err(ReceiptsError::Validation("Title is required".to_string()));
    }
    let amount = amount.trim();
    validate_amount(amount).into_result()?;
    let date = date.trim();
    validate_date(date).into_result()?;
    Ok(ReceiptForm {
        title,
        amount: amount.to_string(),
        currency: sanitize_currency(currency),
        receipt_date: date.to_string(),
    })
}

pub fn load_view(backend: &dyn Backend, synced: Vec<RawInvoice>, today: NaiveDate) -> Result<ReconciledView> {
    let manual = backend.list_receipts()?;
    Ok(reconcile(manual, synced, today))
}

pub fn receipt_table(view: &ReconciledView) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Title", "Amount"]);
    for r in &view.records {
        table.add_row(vec![
            Cell::new(r.editable_id.as_deref().unwrap_or("-")),
            Cell::new(r.occurred_on.label()),
            Cell::new(&r.display_title),
            Cell::new(money(r.amount, &r.currency)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn render(view: &ReconciledView, theme: Theme) {
    println!("{}", heading(theme, "Receipts"));
    if view.records.is_empty() {
        println!("No receipts found.");
    } else {
        println!("{}", receipt_table(view));
        let synced = view.records.iter().filter(|r| !r.is_editable()).count();
        if synced > 0 {
            println!(
                "{}",
                muted(theme, &format!("{synced} synced invoice(s) are read-only (ID shown as -)."))
            );
        }
    }
    println!("This month: {}", success(theme, &view.total_label()).bold());
}

pub fn list() -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    let view = load_view(&backend, Vec::new(), today())?;
    render(&view, settings.theme);
    Ok(())
}

pub fn add_with(backend: &dyn Backend, form: &ReceiptForm) -> Result<()> {
    backend
        .create_receipt(form)
        .map_err(|e| e.or_message("Failed to add receipt"))
}

pub fn add(title: &str, amount: &str, currency: &str, date: &str) -> Result<()> {
    let form = build_form(title, amount, currency, date)?;
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    add_with(&backend, &form)?;
    println!("Added receipt: {}", form.title);
    render(&load_view(&backend, Vec::new(), today())?, settings.theme);
    Ok(())
}

pub fn edit_with(backend: &dyn Backend, id: &str, form: &ReceiptForm) -> Result<()> {
    backend
        .edit_receipt(id, form)
        .map_err(|e| e.or_message("Update failed"))
}

pub fn edit(id: &str, title: &str, amount: &str, currency: &str, date: &str) -> Result<()> {
    let form = build_form(title, amount, currency, date)?;
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    edit_with(&backend, id, &form)?;
    println!("Updated receipt {id}");
    render(&load_view(&backend, Vec::new(), today())?, settings.theme);
    Ok(())
}

/// Returns `false` when the user backs out; nothing is sent in that case.
pub fn delete_with(backend: &dyn Backend, id: &str, confirmed: impl FnOnce() -> bool) -> Result<bool> {
    if !confirmed() {
        return Ok(false);
    }
    backend
        .delete_receipt(id)
        .map_err(|e| e.or_message("Delete failed"))?;
    Ok(true)
}

pub fn delete(id: &str, yes: bool) -> Result<()> {
    let settings = load_settings();
    let backend = session_backend(&settings)?;
    let deleted = delete_with(&backend, id, || {
        confirm("Are you sure you want to delete this receipt?", yes)
    })?;
    if !deleted {
        println!("Cancelled.");
        return Ok(());
    }
    println!("Deleted receipt {id}");
    render(&load_view(&backend, Vec::new(), today())?, settings.theme);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockBackend;
    use crate::api::Endpoint;
    use crate::models::RawManualReceipt;

    fn sample_form() -> ReceiptForm {
        build_form("Lunch", "120", "twd", "2025-03-01").unwrap()
    }

    #[test]
    fn test_build_form_normalizes() {
        let form = build_form(" <i>Lunch</i> ", " 120.5 ", "usd", "2025-03-01").unwrap();
        assert_eq!(form.title, "Lunch");
        assert_eq!(form.amount, "120.5");
        assert_eq!(form.currency, "USD");
        assert_eq!(form.receipt_date, "2025-03-01");
    }

    #[test]
    fn test_build_form_rejects_bad_input() {
        assert_eq!(
            build_form("", "1", "TWD", "2025-03-01").unwrap_err().to_string(),
            "Title is required"
        );
        assert_eq!(
            build_form("x", "0", "TWD", "2025-03-01").unwrap_err().to_string(),
            "Amount must be greater than 0"
        );
        assert_eq!(
            build_form("x", "5", "TWD", "03/01/2025").unwrap_err().to_string(),
            "Date must be in YYYY-MM-DD format"
        );
    }

    #[test]
    fn test_add_posts_create() {
        let backend = MockBackend::default();
        add_with(&backend, &sample_form()).unwrap();
        assert_eq!(backend.calls(), vec![Endpoint::CreateReceipt]);
    }

    #[test]
    fn test_edit_targets_id() {
        let backend = MockBackend::default();
        edit_with(&backend, "65f0", &sample_form()).unwrap();
        assert_eq!(backend.calls(), vec![Endpoint::EditReceipt("65f0".to_string())]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let backend = MockBackend::default();
        assert!(!delete_with(&backend, "65f0", || false).unwrap());
        assert!(backend.calls().is_empty());
        assert!(delete_with(&backend, "65f0", || true).unwrap());
        assert_eq!(backend.calls(), vec![Endpoint::DeleteReceipt("65f0".to_string())]);
    }

    #[test]
    fn test_rejected_delete_surfaces_server_message() {
        let backend = MockBackend::default();
        backend.reject_mutations.set(true);
        let err = delete_with(&backend, "65f0", || true).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
    }

    #[test]
    fn test_table_lists_records() {
        let backend = MockBackend {
            receipts: vec![RawManualReceipt {
                id: Some(json!("65f0")),
                title: Some("Books".to_string()),
                amount: Some(json!(320)),
                currency: Some("TWD".to_string()),
                receipt_date: Some("2025-03-04".to_string()),
            }],
            ..MockBackend::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let view = load_view(&backend, Vec::new(), today).unwrap();
        let rendered = receipt_table(&view).to_string();
        assert!(rendered.contains("Books"));
        assert!(rendered.contains("65f0"));
        assert!(rendered.contains("320.00 TWD"));
        assert_eq!(view.total_label(), "320.00");
    }
}
