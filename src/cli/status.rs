use crate::error::Result;
use crate::session::load_session;
use crate::settings::{config_dir, load_settings, settings_file_exists};

pub fn run() -> Result<()> {
    let settings = load_settings();

    println!("Server:     {}", settings.effective_server_url());
    println!("Config dir: {}", config_dir().display());
    println!("Theme:      {}", settings.theme.as_str());

    match load_session() {
        Some(session) => println!("Session:    {}", session.email),
        None => println!("Session:    (not logged in)"),
    }

    if !settings_file_exists() {
        println!();
        println!("No settings saved yet. Run `receipts init` to choose a server.");
    }

    Ok(())
}
