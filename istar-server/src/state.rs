//! Application state shared across all request handlers.

use istar_core::services::{OrderOrchestrator, WebhookReconciler};
use istar_sdk::client::UpstreamClient;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderOrchestrator>,
    pub reconciler: Arc<WebhookReconciler>,
    /// Used directly by the pass-through endpoints.
    pub upstream: Arc<UpstreamClient>,
    /// Inbound API key (can be reloaded via SIGHUP).
    access_key: Arc<RwLock<String>>,
}

impl AppState {
    pub fn new(
        orchestrator: OrderOrchestrator,
        reconciler: WebhookReconciler,
        upstream: Arc<UpstreamClient>,
        access_key: String,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            reconciler: Arc::new(reconciler),
            upstream,
            access_key: Arc::new(RwLock::new(access_key)),
        }
    }

    /// Get a read lock on the inbound API key.
    pub async fn access_key(&self) -> tokio::sync::RwLockReadGuard<'_, String> {
        self.access_key.read().await
    }

    /// Replace the inbound API key (used during SIGHUP reload).
    pub async fn update_access_key(&self, key: String) {
        let mut access_key = self.access_key.write().await;
        *access_key = key;
    }
}
