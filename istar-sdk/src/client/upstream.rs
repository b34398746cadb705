//! Upstream provider client (gateway → provider).
//!
//! Every request carries the shared `API-Key` header and a JSON body.
//! Responses are classified into the gateway taxonomy before they leave
//! this module: the expected success code is decoded into the typed
//! response, everything else becomes a [`ClientError`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{ClientConfig, ClientError};
use crate::objects::{
    CreatePremiumOrderRequest, CreateStarOrderRequest, PremiumOrderResponse, PremiumRecipientQuery,
    StarOrderResponse, StarRecipientQuery,
};
use crate::signature::API_KEY_HEADER;

/// Longest error body excerpt written to the log.
const LOGGED_BODY_LIMIT: usize = 512;

/// Typed HTTP client for the upstream gift provider.
///
/// Cloning is cheap and clones share one connection pool, so a single
/// client can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    api_key: String,
    max_retries: u32,
    request_timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Build a client with its own connection pool from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            max_retries: config.max_retries,
            request_timeout: None,
        })
    }

    /// Override the timeout for every request sent through this handle.
    ///
    /// The returned client still shares the connection pool.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// `POST /orders/star` – create a star order, answered with 202.
    pub async fn create_star_order_async(
        &self,
        request: &CreateStarOrderRequest,
    ) -> Result<StarOrderResponse, ClientError> {
        let response: StarOrderResponse = self
            .post_typed("/orders/star", request, StatusCode::ACCEPTED)
            .await?;
        info!(order_id = %response.order_id, "Star order created (async)");
        Ok(response)
    }

    /// `POST /orders/star/sync` – create a star order and wait for the
    /// provider to settle it, answered with 200.
    pub async fn create_star_order_sync(
        &self,
        request: &CreateStarOrderRequest,
    ) -> Result<StarOrderResponse, ClientError> {
        let response: StarOrderResponse = self
            .post_typed("/orders/star/sync", request, StatusCode::OK)
            .await?;
        info!(order_id = %response.order_id, "Star order created (sync)");
        Ok(response)
    }

    /// `POST /orders/premium` – create a premium order, answered with 202.
    pub async fn create_premium_order_async(
        &self,
        request: &CreatePremiumOrderRequest,
    ) -> Result<PremiumOrderResponse, ClientError> {
        let response: PremiumOrderResponse = self
            .post_typed("/orders/premium", request, StatusCode::ACCEPTED)
            .await?;
        info!(order_id = %response.order_id, "Premium order created (async)");
        Ok(response)
    }

    /// `POST /orders/premium/sync` – create a premium order and wait for
    /// the provider to settle it, answered with 200.
    pub async fn create_premium_order_sync(
        &self,
        request: &CreatePremiumOrderRequest,
    ) -> Result<PremiumOrderResponse, ClientError> {
        let response: PremiumOrderResponse = self
            .post_typed("/orders/premium/sync", request, StatusCode::OK)
            .await?;
        info!(order_id = %response.order_id, "Premium order created (sync)");
        Ok(response)
    }

    /// `GET /star/recipient/search`.
    pub async fn search_star_recipient(
        &self,
        query: &StarRecipientQuery,
    ) -> Result<serde_json::Value, ClientError> {
        self.get_json(
            "/star/recipient/search",
            &[
                ("username", query.username.clone()),
                ("quantity", query.quantity.to_string()),
            ],
        )
        .await
    }

    /// `GET /premium/recipient/search`.
    pub async fn search_premium_recipient(
        &self,
        query: &PremiumRecipientQuery,
    ) -> Result<serde_json::Value, ClientError> {
        self.get_json(
            "/premium/recipient/search",
            &[
                ("username", query.username.clone()),
                ("months", query.months.to_string()),
            ],
        )
        .await
    }

    /// `GET /premium/packages`.
    pub async fn premium_packages(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json("/premium/packages", &[]).await
    }

    /// `GET /wallet/balance`.
    pub async fn wallet_balance(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json("/wallet/balance", &[]).await
    }

    /// Pass-through `GET`: any 200 body is returned as raw JSON.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ClientError> {
        let response = self.execute(Method::GET, path, query, None).await?;
        classify(&Method::GET, path, response, StatusCode::OK).await
    }

    /// Pass-through `POST`: `body` is sent as JSON and any 200 body is
    /// returned as raw JSON.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        self.post_typed(path, body, StatusCode::OK).await
    }

    async fn post_typed<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        expected: StatusCode,
    ) -> Result<T, ClientError> {
        let payload = serde_json::to_vec(body).map_err(|e| {
            error!(path, error = %e, "Failed to encode request");
            ClientError::Encode(e)
        })?;
        let response = self
            .execute(Method::POST, path, &[], Some(payload))
            .await?;
        classify(&Method::POST, path, response, expected).await
    }

    /// Append `path` to the base URL the way the provider documents it
    /// (plain concatenation, so a base path such as `/v1` is kept).
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Send one logical request.
    ///
    /// Only failures to establish a connection are retried, since such a
    /// request never reached the provider.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<Response, ClientError> {
        let url = self.endpoint(path)?;
        let mut attempt = 0u32;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(API_KEY_HEADER, &self.api_key)
                .header(CONTENT_TYPE, "application/json");
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = &body {
                request = request.body(body.clone());
            }
            if let Some(timeout) = self.request_timeout {
                request = request.timeout(timeout);
            }

            debug!(method = %method, path, attempt, "Sending provider request");
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        method = %method,
                        path,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Provider connection failed, retrying"
                    );
                }
                Err(e) => {
                    error!(method = %method, path, error = %e, "Failed to send provider request");
                    return Err(ClientError::Http(e));
                }
            }
        }
    }
}

async fn classify<T: DeserializeOwned>(
    method: &Method,
    path: &str,
    response: Response,
    expected: StatusCode,
) -> Result<T, ClientError> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        error!(
            method = %method,
            path,
            status = status.as_u16(),
            body = truncate(&body, LOGGED_BODY_LIMIT),
            "Unexpected status code from provider"
        );
        return Err(ClientError::from_status(status));
    }

    let bytes = response.bytes().await?;
    let decoded = serde_json::from_slice(&bytes).map_err(|e| {
        error!(method = %method, path, error = %e, "Failed to decode provider response");
        ClientError::Decode(e)
    })?;
    info!(method = %method, path, status = status.as_u16(), "Provider request succeeded");
    Ok(decoded)
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
