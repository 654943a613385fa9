//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to PostgREST.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing PostgREST environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed.
    #[error("failed to build PostgREST client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send PostgREST request to `{table}`")]
    RequestSend {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// PostgREST answered with a non-success status.
    #[error("unexpected PostgREST response status {status} for `{table}`")]
    RequestStatus {
        table: &'static str,
        status: StatusCode,
    },
    /// Response payload could not be decoded.
    #[error("failed to decode PostgREST response for `{table}`")]
    DecodeResponse {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// A stored timestamp is not RFC 3339.
    #[error("invalid timestamp `{value}` in `{table}`")]
    InvalidTimestamp { table: &'static str, value: String },
}

impl RestDaoError {
    /// Whether PostgREST rejected the write because of a unique constraint.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RestDaoError::RequestStatus {
                status: StatusCode::CONFLICT,
                ..
            }
        )
    }
}
