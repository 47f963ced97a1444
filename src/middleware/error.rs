use std::fmt;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    Validation { field: String, description: String },
    AuthenticationFail,
    Forbidden,
    PostNotFound { id: String },
    ParentNotFound { id: String },
    ReplyNotFound { id: String },
    ReplyDeleted { id: String },
    MaxDepthExceeded { max_depth: u8 },
    TransactionConflict { attempts: u32 },
    Serde { source: String },
    SurrealDb { source: String },
}

/// Stable machine-readable error codes surfaced to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Generic,
    Validation,
    Unauthenticated,
    Forbidden,
    PostNotFound,
    ParentNotFound,
    ReplyNotFound,
    ReplyDeleted,
    MaxDepthExceeded,
    TransactionConflict,
    Serde,
    Database,
}

/// ApiError has to have the req_id to report to the client and implements IntoResponse.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error for storing before composing a response.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Generic { .. } => ErrorCode::Generic,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::AuthenticationFail => ErrorCode::Unauthenticated,
            Self::Forbidden => ErrorCode::Forbidden,
            Self::PostNotFound { .. } => ErrorCode::PostNotFound,
            Self::ParentNotFound { .. } => ErrorCode::ParentNotFound,
            Self::ReplyNotFound { .. } => ErrorCode::ReplyNotFound,
            Self::ReplyDeleted { .. } => ErrorCode::ReplyDeleted,
            Self::MaxDepthExceeded { .. } => ErrorCode::MaxDepthExceeded,
            Self::TransactionConflict { .. } => ErrorCode::TransactionConflict,
            Self::Serde { .. } => ErrorCode::Serde,
            Self::SurrealDb { .. } => ErrorCode::Database,
        }
    }

    /// Only store contention is worth another attempt; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransactionConflict { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::MaxDepthExceeded { .. } | Self::ReplyDeleted { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthenticationFail => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::PostNotFound { .. } | Self::ParentNotFound { .. } | Self::ReplyNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::TransactionConflict { .. } => StatusCode::CONFLICT,
            Self::Generic { .. } | Self::Serde { .. } | Self::SurrealDb { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error: value,
        }
    }
}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        AppError::from(value).into()
    }
}

impl From<ValidationErrors> for CtxError {
    fn from(value: ValidationErrors) -> Self {
        AppError::from(value).into()
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::Validation { field, description } => write!(f, "{field}: {description}"),
            Self::AuthenticationFail => write!(f, "actor identity is required"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::PostNotFound { id } => write!(f, "post id= {id} not found"),
            Self::ParentNotFound { id } => write!(f, "parent reply id= {id} not found"),
            Self::ReplyNotFound { id } => write!(f, "reply id= {id} not found"),
            Self::ReplyDeleted { id } => write!(f, "reply id= {id} is deleted"),
            Self::MaxDepthExceeded { max_depth } => write!(f, "max depth is {max_depth}"),
            Self::TransactionConflict { attempts } => {
                write!(f, "write conflict persisted after {attempts} attempts")
            }
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub error: String,
    pub code: String,
    pub req_id: String,
}

impl ErrorResponseBody {
    pub fn new(error: &AppError, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            error: error.to_string(),
            code: error.code().to_string(),
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

// REST error response
impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.error.status_code();
        if status_code.is_server_error() {
            tracing::error!(req_id = %self.req_id, error = ?self.error, "request failed");
        } else {
            tracing::debug!(req_id = %self.req_id, error = ?self.error, "request rejected");
        }
        let body = ErrorResponseBody::new(&self.error, Some(self.req_id.to_string()));
        let mut response = (status_code, Json(body)).into_response();
        // Insert the real Error into the response - for the logger
        response.extensions_mut().insert(self.error);
        response
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(value: ValidationErrors) -> Self {
        let (field, description) = value
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errors)| {
                let description = errors
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), description)
            })
            .unwrap_or_else(|| ("input".to_string(), value.to_string()));
        Self::Validation { field, description }
    }
}
