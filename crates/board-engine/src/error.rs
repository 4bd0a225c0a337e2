//! Error Types
//!
//! `ApiError` is what the remote board API reports; `EngineError` is what
//! engine operations return to the UI.

use thiserror::Error;

use crate::model::{CardId, ColumnId};
use crate::store::StoreError;

/// Failure reported by the remote board API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Session is invalid; only a fresh login recovers
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    /// The server (or local validation) rejected the payload
    #[error("{message}")]
    ValidationRejected { status: Option<u16>, message: String },
    /// The board, column or card no longer exists
    #[error("not found: {message}")]
    NotFound { message: String },
    /// Timeout, transport error or 5xx
    #[error("request failed: {message}")]
    NetworkOrServerFailure { status: Option<u16>, message: String },
}

impl ApiError {
    /// Classify an HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound { message },
            400 | 409 | 422 => ApiError::ValidationRejected {
                status: Some(status),
                message,
            },
            _ => ApiError::NetworkOrServerFailure {
                status: Some(status),
                message,
            },
        }
    }

    /// A request that never produced a response
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::NetworkOrServerFailure {
            status: None,
            message: message.into(),
        }
    }

    /// Rejected before reaching the server
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::ValidationRejected {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::ValidationRejected { status, .. } => *status,
            ApiError::NetworkOrServerFailure { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::NotFound { message }
            | ApiError::ValidationRejected { message, .. }
            | ApiError::NetworkOrServerFailure { message, .. } => message,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of an engine operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("board store rejected update: {0}")]
    Store(#[from] StoreError),
    #[error("no board is open")]
    NoActiveBoard,
    #[error("unknown column {0}")]
    UnknownColumn(ColumnId),
    #[error("unknown card {0}")]
    UnknownCard(CardId),
    #[error("drag no longer matches the board: {0}")]
    StaleGesture(String),
}

impl EngineError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            EngineError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EngineError::Api(ApiError::Unauthorized { .. }))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
