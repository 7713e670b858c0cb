pub mod auth;
pub mod einvoice;
pub mod init;
pub mod receipts;
pub mod status;
pub mod theme;

use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use zeroize::Zeroizing;

use crate::api::HttpBackend;
use crate::error::{ReceiptsError, Result};
use crate::session::require_session;
use crate::settings::Settings;

/// Backend bound to the stored session, for commands that need a login.
pub(crate) fn session_backend(settings: &Settings) -> Result<HttpBackend> {
    let session = require_session()?;
    HttpBackend::new(&settings.effective_server_url(), &session.cookies)
}

/// Ask before a destructive action; `--yes` skips the prompt.
pub(crate) fn confirm(prompt: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

pub(crate) fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<Zeroizing<String>> {
    match password {
        Some(p) => Ok(Zeroizing::new(p)),
        None => rpassword::prompt_password(format!("{prompt}: "))
            .map(Zeroizing::new)
            .map_err(ReceiptsError::from),
    }
}

#[derive(Parser)]
#[command(name = "receipts", about = "Track receipts and e-invoices from the command line.")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose the receipt server to talk to.
    Init {
        /// Server base URL (default: http://localhost:5000)
        #[arg(long)]
        server: Option<String>,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and show this month's receipts.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Manage manually entered receipts.
    Receipt {
        #[command(subcommand)]
        command: ReceiptCommands,
    },
    /// Link, unlink and sync the e-invoice carrier account.
    Einvoice {
        #[command(subcommand)]
        command: EinvoiceCommands,
    },
    /// Show or change the color theme.
    Theme {
        /// dark, light or toggle; omit to show the current theme
        mode: Option<ThemeChoice>,
    },
    /// Show server, session and theme.
    Status,
}

#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// List receipts with this month's total.
    List,
    /// Add a receipt.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        /// Three-letter currency code
        #[arg(long, default_value = "TWD")]
        currency: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Edit a receipt.
    Edit {
        /// Receipt ID (shown in `receipts receipt list`)
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "TWD")]
        currency: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Delete a receipt.
    Delete {
        /// Receipt ID (shown in `receipts receipt list`)
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum EinvoiceCommands {
    /// Show whether a carrier account is linked.
    Status,
    /// Link a carrier account, or update the linked one.
    Link {
        /// Carrier username (usually the mobile barcode, e.g. /ABC+123)
        #[arg(long)]
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove the linked carrier account.
    Unlink {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Pull carrier invoices and show them with manual receipts.
    Sync,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}
