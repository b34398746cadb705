//! Provider webhook receiver.
//!
//! Authenticated by the `X-iStar-Signature` body signature rather than the
//! `API-Key` header, so the raw bytes are handed to the reconciler as-is.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap, response::IntoResponse};
use istar_sdk::signature::SIGNATURE_HEADER;
use serde_json::json;

use crate::api::error::ApiError;
use crate::state::AppState;

/// `POST /webhooks/istar`
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    state.reconciler.reconcile(&body, signature).await?;
    Ok(Json(json!({ "status": "ok" })))
}
