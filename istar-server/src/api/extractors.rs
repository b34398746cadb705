//! Custom Axum extractors for request authentication.
//!
//! Provides `ApiKeyAuth`, which checks the `API-Key` header against the
//! configured inbound key. The comparison itself lives in
//! [`istar_sdk::signature::verify_api_key`].

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use istar_sdk::signature::{API_KEY_HEADER, verify_api_key};
use serde_json::json;

use crate::state::AppState;

/// Marker extractor: the request carried a valid `API-Key` header.
///
/// Implements `FromRequestParts` so it can be combined with `Json<T>`,
/// `Query<T>`, etc.
pub struct ApiKeyAuth;

/// Errors returned by the [`ApiKeyAuth`] extractor.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiKeyError {
    Missing,
    Invalid,
}

impl IntoResponse for ApiKeyError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiKeyError::Missing => "API key required",
            ApiKeyError::Invalid => "invalid API key",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiKeyError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or(ApiKeyError::Missing)?
            .to_str()
            .map_err(|_| ApiKeyError::Invalid)?;
        if provided.trim().is_empty() {
            return Err(ApiKeyError::Missing);
        }

        let expected = state.access_key().await;
        if !verify_api_key(provided, &expected) {
            tracing::debug!("Rejected request with invalid API key");
            return Err(ApiKeyError::Invalid);
        }
        Ok(ApiKeyAuth)
    }
}
