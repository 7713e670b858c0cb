use dialoguer::Input;

use crate::error::{ReceiptsError, Result};
use crate::settings::{load_settings, save_settings, settings_file_exists};

pub fn normalize_server_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ReceiptsError::Settings(format!(
            "Server URL must start with http:// or https:// (got {url:?})"
        )));
    }
    Ok(url.to_string())
}

pub fn run(server: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(url) = server {
        settings.server_url = normalize_server_url(&url)?;
    } else if !settings_file_exists() {
        // First run: offer the default
        let chosen: String = Input::new()
            .with_prompt("Server URL")
            .default(settings.server_url.clone())
            .interact_text()
            .map_err(|e| ReceiptsError::Other(e.to_string()))?;
        settings.server_url = normalize_server_url(&chosen)?;
    }

    save_settings(&settings)?;
    println!("Using server {}", settings.server_url);
    Ok(())
}
