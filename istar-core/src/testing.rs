//! Test doubles shared with the server crate (`testing` feature).
//!
//! - [`MockProvider`]: an axum server on `127.0.0.1:0` that plays the
//!   upstream provider with canned responses
//! - [`RecordingStore`]: wraps an [`OrderStore`] and counts calls

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use istar_sdk::signature::API_KEY_HEADER;
use url::Url;

use crate::entities::Order;
use crate::store::{OrderStore, StatusUpdate, StoreError};

/// One request observed by the [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub query: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct ProviderState {
    responses: HashMap<String, (u16, serde_json::Value)>,
    requests: HashMap<String, Vec<RecordedRequest>>,
}

type SharedState = Arc<Mutex<ProviderState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ProviderState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A fake upstream provider.
///
/// Requests without the expected `API-Key` are answered with 401, paths
/// without a canned response with 404.
pub struct MockProvider {
    base_url: Url,
    state: SharedState,
    server: tokio::task::JoinHandle<()>,
}

impl MockProvider {
    /// Key the mock expects in the `API-Key` header.
    pub const API_KEY: &'static str = "mock-provider-key";

    pub async fn start() -> std::io::Result<Self> {
        let state = SharedState::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = Router::new().fallback(handle).with_state(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        Ok(Self {
            base_url,
            state,
            server,
        })
    }

    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Answer every request to `path` with `status` and `body`.
    pub fn respond(&self, path: &str, status: u16, body: serde_json::Value) {
        lock(&self.state)
            .responses
            .insert(path.to_owned(), (status, body));
    }

    /// Number of authenticated requests received on `path`.
    pub fn requests(&self, path: &str) -> usize {
        lock(&self.state).requests.get(path).map_or(0, Vec::len)
    }

    /// The most recent authenticated request received on `path`.
    pub fn last_request(&self, path: &str) -> Option<RecordedRequest> {
        lock(&self.state)
            .requests
            .get(path)
            .and_then(|requests| requests.last().cloned())
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorized = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(MockProvider::API_KEY);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "invalid api key" })),
        )
            .into_response();
    }

    let path = uri.path().to_owned();
    let mut state = lock(&state);
    state
        .requests
        .entry(path.clone())
        .or_default()
        .push(RecordedRequest {
            query: uri.query().map(str::to_owned),
            body: serde_json::from_slice(&body).ok(),
        });

    match state.responses.get(&path) {
        Some((status, body)) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, axum::Json(body.clone())).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Wraps an [`OrderStore`] and counts the calls made through it.
#[derive(Debug, Default)]
pub struct RecordingStore<S> {
    inner: S,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: OrderStore> OrderStore for RecordingStore<S> {
    async fn create_order(&self, order: &Order) -> Result<(), StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create_order(order).await
    }

    async fn update_order_status(&self, update: StatusUpdate) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update_order_status(update).await
    }
}
