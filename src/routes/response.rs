use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routes::tasks::model::Pagination;
use crate::routes::tasks::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
            pagination: None,
            errors: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
            pagination: None,
            errors: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        /// Only set when error detail may be shown to clients.
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn validation(errors: BTreeMap<String, String>) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    /// A rejected request whose problem is not tied to one body field.
    pub fn bad_request(message: impl Into<String>, cause: impl ToString) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert("general".to_string(), cause.to_string());
        ApiError::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn task_not_found() -> Self {
        ApiError::NotFound("Task not found".to_string())
    }

    /// Logs `err` and hides its text unless `expose_detail` is set.
    pub fn store(message: &str, err: StoreError, expose_detail: bool) -> Self {
        if err.is_retryable() {
            tracing::warn!(error = %err, "{message}");
        } else {
            tracing::error!(error = %err, "{message}");
        }

        ApiError::Internal {
            message: message.to_string(),
            detail: expose_detail.then(|| err.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, errors) = match self {
            ApiError::Validation { message, errors } => (message, Some(errors)),
            ApiError::NotFound(message) => (message, None),
            ApiError::Internal { message, detail } => (
                message,
                detail.map(|d| BTreeMap::from([("detail".to_string(), d)])),
            ),
        };

        let body = Envelope::<()> {
            status: Status::Error,
            message,
            data: None,
            pagination: None,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
