use thiserror::Error;

/// Result type alias for DAO operations
pub type Result<T, E = DaoError> = std::result::Result<T, E>;

/// Errors that can occur while assembling, issuing, or parsing a DAO request
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("endpoint URL not defined for method: {key}")]
    EndpointUrlNotDefined { key: String },

    #[error("endpoint URL not assembled, no value for :{placeholder}: in {url}")]
    EndpointUrlNotAssembled { placeholder: String, url: String },

    #[error("fetch operation {method} is not implemented by {dao_type}")]
    FetchNotImplemented { method: String, dao_type: String },

    #[error("no data source configured under name: {0}")]
    SourceNotConfigured(String),

    #[error("upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse {format} response: {message}")]
    ParseFailed {
        format: &'static str,
        message: String,
    },
}
