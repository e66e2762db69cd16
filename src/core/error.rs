//! Error taxonomy for rate synchronization

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    #[error("Failed to fetch rates from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse rate feed: {0}")]
    Parse(String),

    #[error("Failed to read stored rates: {0}")]
    StorageRead(String),

    #[error("Failed to write stored rates: {0}")]
    StorageWrite(String),
}

impl RateError {
    pub fn fetch(url: &str, message: impl ToString) -> Self {
        RateError::Fetch {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}
