use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Not logged in. Run `receipts login` first.")]
    NotLoggedIn,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl ReceiptsError {
    /// Replace an empty server message with an operation-specific fallback.
    pub fn or_message(self, fallback: &str) -> Self {
        match self {
            ReceiptsError::Api { status, message } if message.trim().is_empty() => {
                ReceiptsError::Api {
                    status,
                    message: fallback.to_string(),
                }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReceiptsError>;
