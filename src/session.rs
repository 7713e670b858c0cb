use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReceiptsError, Result};
use crate::settings::config_dir;

/// The signed-in user and the backend cookies that authenticate them.
///
/// Written on login, removed on logout. Nothing else about the account is
/// stored; e-invoice linkage is always asked of the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    #[serde(default)]
    pub cookies: Vec<String>,
}

fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn load_session() -> Option<Session> {
    load_session_from(&session_path())
}

pub fn load_session_from(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Like [`load_session`], but a missing session is an error.
pub fn require_session() -> Result<Session> {
    load_session().ok_or(ReceiptsError::NotLoggedIn)
}

pub fn save_session(session: &Session) -> Result<()> {
    save_session_to(&session_path(), session)
}

pub fn save_session_to(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    let mut file = session_file_options().open(path)?;
    // A file left over from before keeps its old mode; tighten it first.
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(format!("{json}\n").as_bytes())?;
    Ok(())
}

/// The file holds live backend cookies, so only the owner may read it.
fn session_file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    options
}

pub fn clear_session() -> Result<()> {
    clear_session_at(&session_path())
}

pub fn clear_session_at(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
