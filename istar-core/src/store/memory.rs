use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{OrderStore, StatusUpdate, StoreError};
use crate::entities::Order;

/// Order store backed by a map keyed by order id.
///
/// Orders live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored order.
    pub async fn get_order(&self, order_id: Uuid) -> Option<Order> {
        self.orders.read().await.get(&order_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    #[tracing::instrument(skip_all, err, name = "store.create_order")]
    async fn create_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id));
        }
        orders.insert(order.id, order.clone());
        debug!(order_id = %order.id, status = %order.status, "Order stored");
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "store.update_order_status")]
    async fn update_order_status(&self, update: StatusUpdate) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&update.order_id)
            .ok_or(StoreError::OrderNotFound(update.order_id))?;

        order.status = update.status;
        order.tx_hash = update.tx_hash;
        order.completed_at = update.completed_at;
        order.error_message = update.error_message;
        order.updated_at = OffsetDateTime::now_utc();

        debug!(order_id = %order.id, status = %order.status, "Order status updated");
        Ok(())
    }
}
