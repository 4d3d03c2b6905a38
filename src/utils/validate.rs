//! Request extractors that reject with [`AppError`] so every failure is
//! rendered as a result envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// JSON body, deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string, deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

/// Path parameters with envelope-shaped rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordPath<T>(pub T);

impl<T, S> FromRequestParts<S> for RecordPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(RecordPath(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Missing or invalid Content-Type header, expected application/json".to_string()
            }
            JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
            JsonRejection::JsonDataError(e) => format!("Invalid JSON body: {}", e.body_text()),
            other => other.body_text(),
        };
        AppError::BadRequest { message }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: format!("Invalid query parameters: {}", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest {
            message: format!("Invalid path parameters: {}", rejection.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct AmountBody {
        #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than 0"))]
        amount: f64,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct LimitQuery {
        #[validate(range(min = 1, max = 100))]
        limit: Option<u32>,
    }

    fn json_request(body: &str, content_type: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json() {
        let req = json_request(r#"{"amount": 12.5}"#, "application/json");
        let ValidatedJson(body) = ValidatedJson::<AmountBody>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(body.amount, 12.5);
    }

    #[tokio::test]
    async fn test_json_failing_validation() {
        let req = json_request(r#"{"amount": 0}"#, "application/json");
        match ValidatedJson::<AmountBody>::from_request(req, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "amount");
                assert_eq!(errors[0].message, "Amount must be greater than 0");
            }
            other => panic!("Expected ValidationErrors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_wrong_content_type() {
        let req = json_request(r#"{"amount": 1}"#, "text/plain");
        let err = ValidatedJson::<AmountBody>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { ref message } if message.contains("Content-Type")));
    }

    #[tokio::test]
    async fn test_json_missing_field() {
        let req = json_request("{}", "application/json");
        let err = ValidatedJson::<AmountBody>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_query_validation() {
        let (mut parts, _) = Request::builder()
            .uri("/test?limit=500")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<LimitQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationErrors { .. }));

        let (mut parts, _) = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let ValidatedQuery(query) = ValidatedQuery::<LimitQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(query.limit, None);
    }
}
