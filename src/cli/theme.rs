use crate::error::Result;
use crate::fmt::heading;
use crate::settings::{load_settings, save_settings, Theme};

use super::ThemeChoice;

pub fn resolve(current: Theme, choice: ThemeChoice) -> Theme {
    match choice {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
        ThemeChoice::Toggle => current.toggled(),
    }
}

pub fn run(choice: Option<ThemeChoice>) -> Result<()> {
    let mut settings = load_settings();
    let Some(choice) = choice else {
        println!("Theme: {}", settings.theme.as_str());
        return Ok(());
    };
    settings.theme = resolve(settings.theme, choice);
    save_settings(&settings)?;
    println!("{}", heading(settings.theme, &format!("Theme set to {}", settings.theme.as_str())));
    Ok(())
}
