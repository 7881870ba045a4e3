use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteConfigError {
    #[error("No server template is loaded. Call load() or set() before evaluate().")]
    NotLoaded,
    #[error("Failed to fetch the server template: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Server template request failed with status {status}: {body}")]
    FetchStatus { status: StatusCode, body: String },
    #[error("Server template request timed out after {0} ms")]
    FetchTimeout(u128),
    #[error("Parameter '{0}' is not present in the evaluated config")]
    MissingKey(String),
    #[error("Malformed server template: {0}")]
    MalformedTemplate(String),
    #[error("Invalid Remote Config options: {0}")]
    InvalidOptions(String),
}

impl RemoteConfigError {
    pub fn malformed(message: impl Into<String>) -> Self {
        RemoteConfigError::MalformedTemplate(message.into())
    }

    /// True for every failure that came out of the network fetch.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            RemoteConfigError::Fetch(_)
                | RemoteConfigError::FetchStatus { .. }
                | RemoteConfigError::FetchTimeout(_)
        )
    }
}

impl From<serde_json::Error> for RemoteConfigError {
    fn from(err: serde_json::Error) -> Self {
        RemoteConfigError::MalformedTemplate(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RemoteConfigError>;
