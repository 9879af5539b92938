use std::path::PathBuf;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered HTTP {status}: {}", error.message)]
    Status { status: u16, error: ApiError },
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FetchError {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            error: ApiError::from_response(status, body),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Status { error, .. } => error.code,
            Self::Transport(_) => ErrorCode::Unavailable,
            Self::InvalidBaseUrl(_) | Self::Malformed(_) => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("failed to download spreadsheet: {0}")]
    Fetch(#[from] FetchError),
    #[error("backend returned an empty spreadsheet")]
    EmptyPayload,
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
