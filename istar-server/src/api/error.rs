//! Error responses of the REST API.
//!
//! Every error is rendered as `{"error": "<message>"}` with the status code
//! of its kind. Internal failures are logged and answered with a generic
//! message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use istar_core::GatewayError;
use istar_sdk::ErrorKind;
use istar_sdk::objects::RequestValidationError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body or query string could not be parsed or failed
    /// validation.
    BadRequest(String),
    /// A gateway operation failed.
    Gateway(GatewayError),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<istar_sdk::client::ClientError> for ApiError {
    fn from(err: istar_sdk::client::ClientError) -> Self {
        ApiError::Gateway(err.into())
    }
}

impl From<RequestValidationError> for ApiError {
    fn from(err: RequestValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn status_of(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Gateway(e) => match e.kind() {
                ErrorKind::Internal => {
                    tracing::error!(error = %e, "API internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
                kind => {
                    let message = match &e {
                        GatewayError::Upstream(client) => client.to_string(),
                        other => other.to_string(),
                    };
                    (status_of(kind), message)
                }
            },
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use istar_sdk::client::ClientError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_kinds_map_to_status_codes() {
        let (status, body) = render(ApiError::from(ClientError::BadRequest)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid request parameters");

        let (status, body) = render(ApiError::from(ClientError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "resource not found");

        let (status, body) = render(ApiError::from(ClientError::Unauthorized)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "upstream rejected gateway credentials");

        let (status, _) = render(ApiError::from(GatewayError::Unauthorized(
            "invalid webhook signature".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = GatewayError::Internal("invalid created_at timestamp".to_string());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn test_validation_message() {
        let (status, body) = render(RequestValidationError::InvalidMonths(5).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "months must be 3, 6, or 12, got 5");
    }
}
