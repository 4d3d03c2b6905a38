use thiserror::Error;

use crate::envelope::ErrorCode;

/// Outcome of a failed call to the spreadsheet service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a non-success HTTP status, or with
    /// `success: false` in an otherwise successful response.
    #[error("spreadsheet service returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// The request never produced a response.
    #[error("spreadsheet service unreachable: {0}")]
    Network(String),

    #[error("unexpected response from spreadsheet service: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn classify(&self) -> ErrorCode {
        match self {
            TransportError::Status { status, .. } => match status {
                401 => ErrorCode::Unauthorized,
                403 => ErrorCode::Forbidden,
                404 => ErrorCode::NotFound,
                429 => ErrorCode::RateLimited,
                500..=599 => ErrorCode::UpstreamServerError,
                _ => ErrorCode::Unknown,
            },
            TransportError::Network(_) => ErrorCode::Transport,
            TransportError::Decode(_) => ErrorCode::Unknown,
        }
    }

    /// Caller-facing message for this failure.
    pub fn describe(&self) -> String {
        match self.classify() {
            ErrorCode::Unauthorized => "Spreadsheet service rejected the API token".to_string(),
            ErrorCode::Forbidden => "API token lacks access to this datasheet".to_string(),
            ErrorCode::NotFound => "Datasheet or record not found".to_string(),
            ErrorCode::RateLimited => "Too many requests, please retry shortly".to_string(),
            ErrorCode::UpstreamServerError => "Spreadsheet service is unavailable".to_string(),
            ErrorCode::Transport => "Network error, check the connection".to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return TransportError::Status {
                status: status.as_u16(),
                code: None,
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            TransportError::Decode(error.to_string())
        } else {
            TransportError::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> TransportError {
        TransportError::Status {
            status,
            code: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn classifies_http_statuses() {
        assert_eq!(status(401).classify(), ErrorCode::Unauthorized);
        assert_eq!(status(403).classify(), ErrorCode::Forbidden);
        assert_eq!(status(404).classify(), ErrorCode::NotFound);
        assert_eq!(status(429).classify(), ErrorCode::RateLimited);
        assert_eq!(status(500).classify(), ErrorCode::UpstreamServerError);
        assert_eq!(status(503).classify(), ErrorCode::UpstreamServerError);
        assert_eq!(status(400).classify(), ErrorCode::Unknown);
        assert_eq!(status(418).classify(), ErrorCode::Unknown);
    }

    #[test]
    fn classifies_network_and_decode_failures() {
        assert_eq!(
            TransportError::Network("connection refused".into()).classify(),
            ErrorCode::Transport
        );
        assert_eq!(
            TransportError::Decode("expected object".into()).classify(),
            ErrorCode::Unknown
        );
    }

    #[test]
    fn unknown_failures_keep_the_upstream_message() {
        let err = TransportError::Status {
            status: 400,
            code: Some(301),
            message: "field not exist".to_string(),
        };
        assert!(err.describe().contains("field not exist"));
        assert_eq!(status(429).describe(), "Too many requests, please retry shortly");
    }
}
