//! WebhookReconciler service.
//!
//! The WebhookReconciler is responsible for:
//! - Authenticating a provider delivery against the configured mode
//! - Parsing the typed webhook payload
//! - Rejecting deliveries that do not carry a terminal status
//! - Overwriting the settlement fields of the referenced order
//!
//! Replayed deliveries apply the same overwrite again.

use std::sync::Arc;

use istar_sdk::objects::WebhookPayload;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::GatewayError;
use crate::config::WebhookVerification;
use crate::store::{OrderStore, StatusUpdate};

/// Applies provider status callbacks to stored orders.
#[derive(Clone)]
pub struct WebhookReconciler {
    verification: WebhookVerification,
    store: Arc<dyn OrderStore>,
}

impl WebhookReconciler {
    pub fn new(verification: WebhookVerification, store: Arc<dyn OrderStore>) -> Self {
        Self {
            verification,
            store,
        }
    }

    pub fn verification(&self) -> &WebhookVerification {
        &self.verification
    }

    /// Handle one delivery: `body` must be the exact bytes received and
    /// `signature` the `X-iStar-Signature` header value, if present.
    ///
    /// No state is touched unless the signature and the payload are valid.
    pub async fn reconcile(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookPayload, GatewayError> {
        self.verification.verify(body, signature).map_err(|e| {
            warn!(error = %e, "Rejected webhook with invalid signature");
            GatewayError::Unauthorized("invalid webhook signature".to_string())
        })?;

        let payload: WebhookPayload = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Rejected malformed webhook payload");
            GatewayError::Validation("invalid webhook payload".to_string())
        })?;

        if !payload.order.status.is_terminal() {
            warn!(
                order_id = %payload.order.id,
                status = %payload.order.status,
                "Rejected webhook with non-terminal status"
            );
            return Err(GatewayError::Validation(
                "webhook order status must be completed or failed".to_string(),
            ));
        }

        debug!(
            event_type = payload.event_type.as_deref().unwrap_or("-"),
            order_id = %payload.order.id,
            status = %payload.order.status,
            "Webhook received"
        );

        let update = StatusUpdate {
            order_id: payload.order.id,
            status: payload.order.status,
            tx_hash: payload.tx_hash.clone(),
            // settled orders always carry a completion time
            completed_at: Some(
                payload
                    .completed_at
                    .or(payload.occurred_at)
                    .unwrap_or_else(OffsetDateTime::now_utc),
            ),
            error_message: payload.order.error.clone(),
        };
        self.store.update_order_status(update).await.inspect_err(|e| {
            error!(order_id = %payload.order.id, error = %e, "Failed to apply webhook update");
        })?;

        info!(
            order_id = %payload.order.id,
            status = %payload.order.status,
            "Order status updated from webhook"
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Order, OrderItem};
    use crate::store::MemoryOrderStore;
    use crate::testing::RecordingStore;
    use istar_sdk::ErrorKind;
    use istar_sdk::objects::OrderStatus;
    use istar_sdk::signature::sign_body;
    use rust_decimal::Decimal;
    use serde_json::json;
    use time::macros::datetime;
    use uuid::Uuid;

    const SECRET: &str = "webhook-secret";

    async fn setup(
        verification: WebhookVerification,
    ) -> (WebhookReconciler, Arc<RecordingStore<MemoryOrderStore>>, Uuid) {
        let store = Arc::new(RecordingStore::new(MemoryOrderStore::new()));
        let id = Uuid::new_v4();
        store
            .inner()
            .create_order(&Order {
                id,
                item: OrderItem::Star { quantity: 100 },
                status: OrderStatus::Pending,
                username: "alice".to_string(),
                recipient_hash: "h1".to_string(),
                amount: Decimal::new(125, 1),
                wallet_type: "ton".to_string(),
                tx_hash: None,
                created_at: datetime!(2024-01-01 00:00:00 UTC),
                updated_at: datetime!(2024-01-01 00:00:00 UTC),
                completed_at: None,
                error_message: None,
            })
            .await
            .unwrap();
        (WebhookReconciler::new(verification, store.clone()), store, id)
    }

    fn hmac() -> WebhookVerification {
        WebhookVerification::Hmac {
            secret: SECRET.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signed_delivery_updates_order() {
        let (reconciler, store, id) = setup(hmac()).await;
        let body = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "completed" },
            "tx_hash": "0xabc",
            "completed_at": "2024-01-01T00:05:00Z"
        }))
        .unwrap();
        let signature = sign_body(&body, SECRET.as_bytes());

        let payload = reconciler.reconcile(&body, Some(&signature)).await.unwrap();
        assert_eq!(payload.order.id, id);
        assert_eq!(store.update_calls(), 1);

        let order = store.inner().get_order(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.tx_hash.as_deref(), Some("0xabc"));
        assert_eq!(order.completed_at, Some(datetime!(2024-01-01 00:05:00 UTC)));
    }

    #[tokio::test]
    async fn test_failure_records_error_message() {
        let (reconciler, store, id) = setup(hmac()).await;
        let body = serde_json::to_vec(&json!({
            "event_type": "order.failed",
            "order": { "id": id, "status": "failed", "error": "recipient not found" }
        }))
        .unwrap();
        let signature = sign_body(&body, SECRET.as_bytes());

        reconciler.reconcile(&body, Some(&signature)).await.unwrap();
        let order = store.inner().get_order(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
        assert_eq!(order.error_message.as_deref(), Some("recipient not found"));
        assert_eq!(order.tx_hash, None);
    }

    #[tokio::test]
    async fn test_bad_signature_mutates_nothing() {
        let (reconciler, store, id) = setup(hmac()).await;
        let body = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "completed" }
        }))
        .unwrap();
        let signature = sign_body(b"something else", SECRET.as_bytes());

        for signature in [Some(signature.as_str()), None, Some("zz")] {
            let err = reconciler.reconcile(&body, signature).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
        assert_eq!(store.update_calls(), 0);
        assert_eq!(
            store.inner().get_order(id).await.unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_missing_order_fields_never_reach_store() {
        let (reconciler, store, id) = setup(WebhookVerification::Disabled).await;
        let bodies = [
            json!({ "order": { "status": "completed" } }),
            json!({ "order": { "id": id } }),
            json!({ "order": { "id": id, "status": 1 } }),
            json!({ "order": { "id": 42, "status": "completed" } }),
            json!({ "tx_hash": "0xabc" }),
        ];
        for body in bodies {
            let body = serde_json::to_vec(&body).unwrap();
            let err = reconciler.reconcile(&body, None).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        let err = reconciler.reconcile(b"not json", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_replay_reapplies_update() {
        let (reconciler, store, id) = setup(WebhookVerification::Disabled).await;
        let body = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "completed" },
            "tx_hash": "0xabc"
        }))
        .unwrap();

        reconciler.reconcile(&body, None).await.unwrap();
        reconciler.reconcile(&body, None).await.unwrap();
        assert_eq!(store.update_calls(), 2);
        assert_eq!(
            store.inner().get_order(id).await.unwrap().tx_hash.as_deref(),
            Some("0xabc")
        );
    }

    #[tokio::test]
    async fn test_pending_status_cannot_reopen_order() {
        let (reconciler, store, id) = setup(WebhookVerification::Disabled).await;
        let completed = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "completed" },
            "tx_hash": "0xabc",
            "completed_at": "2024-01-01T00:05:00Z"
        }))
        .unwrap();
        reconciler.reconcile(&completed, None).await.unwrap();

        let pending = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "pending" }
        }))
        .unwrap();
        let err = reconciler.reconcile(&pending, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.update_calls(), 1);

        let order = store.inner().get_order(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.tx_hash.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn test_terminal_delivery_always_sets_completed_at() {
        let (reconciler, store, id) = setup(WebhookVerification::Disabled).await;

        let with_occurred_at = serde_json::to_vec(&json!({
            "occurred_at": "2024-01-01T00:06:00Z",
            "order": { "id": id, "status": "completed" }
        }))
        .unwrap();
        reconciler.reconcile(&with_occurred_at, None).await.unwrap();
        let order = store.inner().get_order(id).await.unwrap();
        assert_eq!(order.completed_at, Some(datetime!(2024-01-01 00:06:00 UTC)));

        let bare = serde_json::to_vec(&json!({
            "order": { "id": id, "status": "failed", "error": "timeout" }
        }))
        .unwrap();
        let before = OffsetDateTime::now_utc();
        reconciler.reconcile(&bare, None).await.unwrap();
        let order = store.inner().get_order(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
        assert!(order.completed_at.unwrap() >= before);
    }

    #[tokio::test]
    async fn test_unknown_order_is_internal() {
        let (reconciler, store, _) = setup(WebhookVerification::Disabled).await;
        let body = serde_json::to_vec(&json!({
            "order": { "id": Uuid::new_v4(), "status": "completed" }
        }))
        .unwrap();

        let err = reconciler.reconcile(&body, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(store.update_calls(), 1);
    }
}
