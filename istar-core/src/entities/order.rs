use istar_sdk::objects::{OrderStatus, OrderType, PremiumMonths};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The gift an order purchases.
///
/// A star order carries a quantity and a premium order carries a
/// subscription length, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderItem {
    Star { quantity: u32 },
    Premium { months: PremiumMonths },
}

impl OrderItem {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderItem::Star { .. } => OrderType::Star,
            OrderItem::Premium { .. } => OrderType::Premium,
        }
    }
}

/// A gift order as tracked by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    #[serde(flatten)]
    pub item: OrderItem,
    pub status: OrderStatus,
    pub username: String,
    pub recipient_hash: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub wallet_type: String,
    pub tx_hash: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub error_message: Option<String>,
}

impl Order {
    pub fn order_type(&self) -> OrderType {
        self.item.order_type()
    }

    pub fn quantity(&self) -> Option<u32> {
        match self.item {
            OrderItem::Star { quantity } => Some(quantity),
            OrderItem::Premium { .. } => None,
        }
    }

    pub fn months(&self) -> Option<PremiumMonths> {
        match self.item {
            OrderItem::Premium { months } => Some(months),
            OrderItem::Star { .. } => None,
        }
    }
}
