use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewardsError {
    #[error("Contract call failed: {0}")]
    Call(String),

    /// Only raised inside the normaliser, which maps it to `"N/A"`.
    #[error("Value is not numeric: {0:?}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Explorer request failed: {0}")]
    Explorer(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value {value:?} for {kind}")]
    InvalidInput { kind: String, value: String },

    #[error("{0} is required")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, RewardsError>;

impl RewardsError {
    pub fn invalid(kind: impl Into<String>, value: impl Into<String>) -> Self {
        RewardsError::InvalidInput {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// CSV failures surface as I/O errors; the log is plain text on disk.
impl From<csv::Error> for RewardsError {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => RewardsError::Io(io),
            other => RewardsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{other:?}"),
            )),
        }
    }
}

impl IntoResponse for RewardsError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RewardsError::InvalidInput { .. } | RewardsError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
