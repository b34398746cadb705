//! Premium subscription handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use istar_sdk::objects::{CreatePremiumOrderRequest, PremiumRecipientQuery};

use crate::api::error::ApiError;
use crate::api::extractors::ApiKeyAuth;
use crate::state::AppState;

/// `GET /premium/recipient/search`
pub async fn search_recipient(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    query: Result<Query<PremiumRecipientQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    query.validate()?;

    let recipient = state.upstream.search_premium_recipient(&query).await?;
    Ok(Json(recipient))
}

/// `POST /orders/premium`
///
/// A `months` value other than 3, 6 or 12 fails to deserialize, so such a
/// request never reaches the provider.
pub async fn create_order(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    body: Result<Json<CreatePremiumOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let order = state
        .orchestrator
        .create_premium_order_async(&request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(order)))
}

/// `POST /orders/premium/sync`
pub async fn create_order_sync(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    body: Result<Json<CreatePremiumOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let order = state.orchestrator.create_premium_order_sync(&request).await?;
    Ok(Json(order))
}

/// `GET /premium/packages`
pub async fn packages(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let packages = state.upstream.premium_packages().await?;
    Ok(Json(packages))
}
