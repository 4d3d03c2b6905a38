use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::envelope::ErrorCode;
use crate::external::vika::TransportError;
use crate::governor::GovernorError;

/// One failed field from request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

/// Application-wide error type.
///
/// Every variant maps onto one [`ErrorCode`], which is what reaches callers
/// through the result envelope.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} not found: {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{}", join_field_errors(.errors))]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(
        "Insufficient balance: current {balance:.2}, required {required:.2}, short by {:.2}",
        .required - .balance
    )]
    InsufficientFunds { balance: f64, required: f64 },

    /// Failure reported by, or on the way to, the spreadsheet service
    #[error("{message}")]
    Upstream { code: ErrorCode, message: String },

    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn not_found(entity: &str, field: &str, value: impl ToString) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Duplicate { .. } => ErrorCode::Conflict,
            AppError::Validation { .. }
            | AppError::ValidationErrors { .. }
            | AppError::BadRequest { .. } => ErrorCode::Validation,
            AppError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            AppError::Upstream { code, .. } => *code,
            AppError::Configuration { .. } | AppError::Internal { .. } => ErrorCode::Unknown,
        }
    }

    /// Message safe to hand to API callers.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Configuration { key, .. } => format!("Configuration error: {key}"),
            AppError::Internal { .. } => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

fn join_field_errors(errors: &[ValidationFieldError]) -> String {
    let joined = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("Validation failed: {joined}")
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationFieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors }
    }
}

impl From<TransportError> for AppError {
    fn from(error: TransportError) -> Self {
        AppError::Upstream {
            code: error.classify(),
            message: error.describe(),
        }
    }
}

impl From<GovernorError> for AppError {
    fn from(error: GovernorError) -> Self {
        AppError::Internal {
            source: anyhow::Error::new(error),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(error: CacheError) -> Self {
        AppError::Internal {
            source: anyhow::Error::new(error),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        AppError::Configuration {
            key: error.field().unwrap_or("settings").to_string(),
            source: anyhow::Error::new(error),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
