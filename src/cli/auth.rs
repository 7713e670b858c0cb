use dialoguer::Input;

use crate::api::{Backend, HttpBackend};
use crate::error::{ReceiptsError, Result};
use crate::linkage::EInvoiceAccount;
use crate::session::{clear_session, load_session, save_session, Session};
use crate::settings::load_settings;
use crate::validators::{validate_email, validate_password};

use super::receipts::{load_view, render, today};
use super::{einvoice, password_or_prompt};

fn email_or_prompt(email: Option<String>) -> Result<String> {
    match email {
        Some(e) => Ok(e.trim().to_string()),
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map(|e| e.trim().to_string())
            .map_err(|e| ReceiptsError::Other(e.to_string())),
    }
}

/// Local checks for the login form: a well-formed email and a non-empty password.
pub fn check_login(email: &str, password: &str) -> Result<()> {
    validate_email(email).into_result()?;
    if password.is_empty() {
        return Err(ReceiptsError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// Registration enforces the full password policy.
pub fn check_registration(email: &str, password: &str) -> Result<()> {
    validate_email(email).into_result()?;
    validate_password(password).into_result()
}

pub fn login_with(backend: &dyn Backend, email: &str, password: &str) -> Result<()> {
    check_login(email, password)?;
    backend
        .login(email, password)
        .map_err(|e| e.or_message("Login failed"))
}

pub fn register_with(backend: &dyn Backend, email: &str, password: &str) -> Result<()> {
    check_registration(email, password)?;
    backend
        .register(email, password)
        .map_err(|e| e.or_message("Registration failed"))
}

pub fn login(email: Option<String>, password: Option<String>) -> Result<()> {
    let email = email_or_prompt(email)?;
    let password = password_or_prompt(password, "Password")?;
    check_login(&email, &password)?;

    let settings = load_settings();
    let backend = HttpBackend::new(&settings.effective_server_url(), &[])?;
    login_with(&backend, &email, &password)?;
    save_session(&Session {
        email: email.clone(),
        cookies: backend.cookies(),
    })?;
    println!("Logged in as {email}");

    // Dashboard: receipts and linkage are best effort, like the page load they replace.
    match load_view(&backend, Vec::new(), today()) {
        Ok(view) => render(&view, settings.theme),
        Err(e) => tracing::warn!(error = %e, "could not load receipts"),
    }
    match EInvoiceAccount::fetch(&backend) {
        Ok(account) => einvoice::print_state(&account, settings.theme),
        Err(e) => tracing::warn!(error = %e, "could not check e-invoice status"),
    }
    Ok(())
}

pub fn register(email: Option<String>, password: Option<String>) -> Result<()> {
    let email = email_or_prompt(email)?;
    let password = password_or_prompt(password, "Password")?;
    check_registration(&email, &password)?;

    let settings = load_settings();
    let backend = HttpBackend::new(&settings.effective_server_url(), &[])?;
    register_with(&backend, &email, &password)?;
    println!("Registration successful! Please login.");
    Ok(())
}

pub fn logout() -> Result<()> {
    let Some(session) = load_session() else {
        println!("Not logged in.");
        return Ok(());
    };
    let settings = load_settings();
    let backend = HttpBackend::new(&settings.effective_server_url(), &session.cookies)?;
    // The local session goes regardless of what the server says.
    if let Err(e) = backend.logout() {
        tracing::warn!(error = %e, "server logout failed");
    }
    clear_session()?;
    println!("Logged out {}", session.email);
    Ok(())
}
