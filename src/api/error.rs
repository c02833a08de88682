//! API error taxonomy and its mapping onto the JSON envelope.
//!
//! | Variant         | Status | `error`                               |
//! |-----------------|--------|---------------------------------------|
//! | `InvalidId`     | 400    | `Некорректный ID задачи`              |
//! | `MalformedBody` | 400    | generic failure message of the action |
//! | `Validation`    | 400    | `Ошибка валидации данных` + `details` |
//! | `NotFound`      | 404    | `Задача не найдена`                   |
//! | `Storage`       | 500    | generic failure message of the action |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::ErrorEnvelope;
use crate::store::StoreError;
use crate::task::ValidationErrors;

pub const INVALID_ID: &str = "Некорректный ID задачи";
pub const NOT_FOUND: &str = "Задача не найдена";
pub const VALIDATION_FAILED: &str = "Ошибка валидации данных";
pub const TASK_DELETED: &str = "Задача успешно удалена";

/// The action a handler was performing, used to pick the generic failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Get,
    Update,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Ошибка получения задач",
            Self::Create => "Ошибка создания задачи",
            Self::Get => "Ошибка при получении задачи",
            Self::Update => "Ошибка при обновлении задачи",
            Self::Delete => "Ошибка при удалении задачи",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("task id is not a positive integer")]
    InvalidId,
    #[error("{op:?}: malformed request body: {reason}")]
    MalformedBody { op: Operation, reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("task not found")]
    NotFound,
    #[error("{op:?}: {source}")]
    Storage {
        op: Operation,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn malformed(op: Operation, reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            op,
            reason: reason.into(),
        }
    }

    /// Classify a gateway failure. A row that vanished mid-request is a 404.
    pub fn storage(op: Operation, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(_) => Self::NotFound,
            source => Self::Storage { op, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::MalformedBody { .. } | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(self) -> ErrorEnvelope {
        match self {
            Self::InvalidId => ErrorEnvelope::new(INVALID_ID),
            Self::MalformedBody { op, .. } => ErrorEnvelope::new(op.failure_message()),
            Self::Validation(details) => ErrorEnvelope::with_details(VALIDATION_FAILED, details),
            Self::NotFound => ErrorEnvelope::new(NOT_FOUND),
            Self::Storage { op, .. } => ErrorEnvelope::new(op.failure_message()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }
        (status, Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::malformed(Operation::Update, "bad json").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation(ValidationErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::storage(Operation::Create, StoreError::Worker("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_vanished_row_is_not_found() {
        let err = ApiError::storage(Operation::Update, StoreError::NotFound(3));
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn test_storage_envelope_uses_action_message() {
        let envelope =
            ApiError::storage(Operation::Delete, StoreError::Worker("boom".into())).envelope();
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Ошибка при удалении задачи");
        assert!(json.get("details").is_none());
    }
}
