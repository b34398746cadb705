//! Order persistence.
//!
//! The gateway only ever creates an order and later overwrites its
//! settlement fields, so the store contract is exactly those two writes.

mod memory;

pub use memory::MemoryOrderStore;

use async_trait::async_trait;
use istar_sdk::objects::OrderStatus;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::Order;

/// Errors returned by an [`OrderStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("order already exists: {0}")]
    Duplicate(Uuid),
}

/// Settlement fields applied to an existing order.
///
/// Every field is overwritten, so `None` clears a previously stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub tx_hash: Option<String>,
    pub completed_at: Option<OffsetDateTime>,
    pub error_message: Option<String>,
}

/// Persistence for gift orders.
///
/// Implementations must be safe to call concurrently and apply each write
/// to a single record atomically.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a freshly created order.
    async fn create_order(&self, order: &Order) -> Result<(), StoreError>;

    /// Overwrite the settlement fields of an existing order.
    async fn update_order_status(&self, update: StatusUpdate) -> Result<(), StoreError>;
}
