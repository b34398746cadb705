//! Gateway REST API.
//!
//! # Endpoints
//!
//! - `GET  /star/recipient/search`     – look up a star recipient (pass-through)
//! - `POST /orders/star`               – create a star order, settled later (202)
//! - `POST /orders/star/sync`          – create a star order and wait for settlement
//! - `GET  /premium/recipient/search`  – look up a premium recipient (pass-through)
//! - `POST /orders/premium`            – create a premium order, settled later (202)
//! - `POST /orders/premium/sync`       – create a premium order and wait for settlement
//! - `GET  /premium/packages`          – list premium packages (pass-through)
//! - `GET  /wallet/balance`            – provider wallet balance (pass-through)
//! - `POST /webhooks/istar`            – provider status callbacks
//!
//! Every endpoint except the webhook requires the `API-Key` header.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod error;
pub mod extractors;
mod premium;
mod star;
mod wallet;
mod webhook;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/star/recipient/search", get(star::search_recipient))
        .route("/orders/star", post(star::create_order))
        .route("/orders/star/sync", post(star::create_order_sync))
        .route("/premium/recipient/search", get(premium::search_recipient))
        .route("/orders/premium", post(premium::create_order))
        .route("/orders/premium/sync", post(premium::create_order_sync))
        .route("/premium/packages", get(premium::packages))
        .route("/wallet/balance", get(wallet::balance))
        .route("/webhooks/istar", post(webhook::receive))
}
