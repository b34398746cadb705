//! Star gift handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use istar_sdk::objects::{CreateStarOrderRequest, StarRecipientQuery};

use crate::api::error::ApiError;
use crate::api::extractors::ApiKeyAuth;
use crate::state::AppState;

/// `GET /star/recipient/search`: resolve a recipient before ordering.
pub async fn search_recipient(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    query: Result<Query<StarRecipientQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    query.validate()?;

    let recipient = state.upstream.search_star_recipient(&query).await?;
    Ok(Json(recipient))
}

/// `POST /orders/star`: create a star order; the status arrives later by
/// webhook.
pub async fn create_order(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    body: Result<Json<CreateStarOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let order = state.orchestrator.create_star_order_async(&request).await?;
    Ok((StatusCode::ACCEPTED, Json(order)))
}

/// `POST /orders/star/sync`: create a star order and wait for the final
/// status.
pub async fn create_order_sync(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    body: Result<Json<CreateStarOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let order = state.orchestrator.create_star_order_sync(&request).await?;
    Ok(Json(order))
}
