mod api;
mod cli;
mod error;
mod fmt;
mod linkage;
mod models;
mod reconciler;
mod sanitize;
mod session;
mod settings;
mod validators;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, EinvoiceCommands, ReceiptCommands};

fn init_logging(verbose: bool) {
    let default = if verbose { "receipts=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { server } => cli::init::run(server),
        Commands::Register { email, password } => cli::auth::register(email, password),
        Commands::Login { email, password } => cli::auth::login(email, password),
        Commands::Logout => cli::auth::logout(),
        Commands::Receipt { command } => match command {
            ReceiptCommands::List => cli::receipts::list(),
            ReceiptCommands::Add {
                title,
                amount,
                currency,
                date,
            } => cli::receipts::add(&title, &amount, &currency, &date),
            ReceiptCommands::Edit {
                id,
                title,
                amount,
                currency,
                date,
            } => cli::receipts::edit(&id, &title, &amount, &currency, &date),
            ReceiptCommands::Delete { id, yes } => cli::receipts::delete(&id, yes),
        },
        Commands::Einvoice { command } => match command {
            EinvoiceCommands::Status => cli::einvoice::status(),
            EinvoiceCommands::Link { username, password } => {
                cli::einvoice::link(&username, password)
            }
            EinvoiceCommands::Unlink { yes } => cli::einvoice::unlink(yes),
            EinvoiceCommands::Sync => cli::einvoice::sync(),
        },
        Commands::Theme { mode } => cli::theme::run(mode),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
