use thiserror::Error;

/// Errors raised by one poll cycle. None of these stop the polling loop;
/// they are logged loudly and the next poll is scheduled with backoff.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("widget response is missing the hash field")]
    MissingHash,

    #[error("server error ({type}): {message}")]
    Server { message: String, r#type: String },

    #[error("widget endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("poll request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid widget payload: {0}")]
    InvalidPayload(String),
}
