//! Uniform result envelope returned by every domain operation.
//!
//! `success == true` always carries `data`; `success == false` always has
//! `data: null` plus a message and an [`ErrorCode`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Failure kinds callers can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    Validation,
    Conflict,
    InsufficientFunds,
    NotFound,
    RateLimited,
    Unauthorized,
    Forbidden,
    UpstreamServerError,
    Transport,
    Unknown,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Validation | ErrorCode::InsufficientFunds => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::UpstreamServerError | ErrorCode::Transport => StatusCode::BAD_GATEWAY,
            ErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCode::RateLimited | ErrorCode::UpstreamServerError | ErrorCode::Transport
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error_code: None,
        }
    }

    pub fn fail(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            error_code: Some(code),
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        Self::fail(error.error_code(), error.public_message())
    }

    /// Wraps a fallible outcome; failures are logged once here.
    pub fn from_result(result: AppResult<T>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(data, message),
            Err(error) => {
                let code = error.error_code();
                if code == ErrorCode::Unknown {
                    tracing::error!(error = ?error, "Operation failed");
                } else {
                    tracing::warn!(error_code = ?code, error = %error, "Operation failed");
                }
                Self::from_error(&error)
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
            error_code: self.error_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error_code {
            Some(code) if !self.success => code.status_code(),
            _ => StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Envelope::<()>::from_result(Err(self), "").into_response()
    }
}
