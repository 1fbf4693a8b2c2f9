use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
    /// A server-side failure reported with an operation-specific message.
    #[error("{message}: {detail}")]
    Failed { message: String, detail: String },
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn failed(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Failed {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) | Self::Failed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match e {
            Error::NotFound => Self::NotFound("Record not found".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(format!("Duplicate field value: {}", info.message()))
            }
            other => {
                error!("Query failed: {other}");
                Self::Database(other.to_string())
            }
        }
    }
}

impl From<diesel::r2d2::PoolError> for ApiError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        error!("Failed to get database connection: {e}");
        Self::Database(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!("Blocking task failed: {e}");
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            Self::Database(detail) | Self::Internal(detail) => serde_json::json!({
                "message": "Something went wrong",
                "error": detail,
            }),
            Self::Failed { message, detail } => serde_json::json!({
                "message": message,
                "error": detail,
            }),
            _ => serde_json::json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
