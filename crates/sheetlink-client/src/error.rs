use serde::Deserialize;
use sheetlink_core::AddressError;
use thiserror::Error;

/// Client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),
}

impl ClientError {
    /// Build an API error from a non-success response body, preferring the
    /// message in Google's `{"error": {"message": ...}}` envelope.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: EnvelopeError,
        }

        #[derive(Deserialize)]
        struct EnvelopeError {
            message: String,
        }

        let message = match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) => body.trim().to_string(),
        };

        ClientError::Api { status, message }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP transport error: {:?}", err);
        ClientError::Transport(err.to_string())
    }
}
