//! Wallet handlers.

use axum::{Json, extract::State, response::IntoResponse};

use crate::api::error::ApiError;
use crate::api::extractors::ApiKeyAuth;
use crate::state::AppState;

/// `GET /wallet/balance`: the provider-side balance used to pay for gifts.
pub async fn balance(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = state.upstream.wallet_balance().await?;
    Ok(Json(balance))
}
