use reqwest::StatusCode;
use shared::error::ApiError;
use thiserror::Error;

/// The single failure kind the view ever sees from the student service.
///
/// `Display` renders the text shown to users: `"{message} [{status}] [{error}]"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} [{status}] [{error}]")]
pub struct RemoteError {
    pub message: String,
    pub status: u16,
    pub error: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>, status: u16, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            error: error.into(),
        }
    }

    /// The request never produced an HTTP response.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::new(err.to_string(), 0, "Transport")
    }

    /// A non-success response whose body did not match the error contract.
    pub fn unexpected(status: StatusCode) -> Self {
        Self::new(
            "unexpected response from student service",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
        )
    }

    /// A success response whose body could not be decoded.
    pub fn decode(status: StatusCode, err: impl std::fmt::Display) -> Self {
        Self::new(
            format!("malformed response from student service: {err}"),
            status.as_u16(),
            "Decode",
        )
    }
}

impl From<ApiError> for RemoteError {
    fn from(value: ApiError) -> Self {
        Self {
            message: value.message,
            status: value.status,
            error: value.error,
        }
    }
}
