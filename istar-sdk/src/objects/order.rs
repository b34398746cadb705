//! Order creation requests, provider responses and the order enums.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest number of stars a single order may carry.
pub const MIN_STAR_QUANTITY: u32 = 50;

/// Largest number of stars a single order may carry.
pub const MAX_STAR_QUANTITY: u32 = 1_000_000;

/// The kind of gift an order purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Star,
    Premium,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Star => write!(f, "star"),
            OrderType::Premium => write!(f, "premium"),
        }
    }
}

/// Lifecycle status of an order.
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A status string the gateway does not model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(UnknownOrderStatus(other.to_owned())),
        }
    }
}

/// Length of a premium subscription. Only 3, 6 and 12 months are sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PremiumMonths {
    Three,
    Six,
    Twelve,
}

impl PremiumMonths {
    pub fn get(self) -> u32 {
        match self {
            PremiumMonths::Three => 3,
            PremiumMonths::Six => 6,
            PremiumMonths::Twelve => 12,
        }
    }
}

impl TryFrom<u32> for PremiumMonths {
    type Error = RequestValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(PremiumMonths::Three),
            6 => Ok(PremiumMonths::Six),
            12 => Ok(PremiumMonths::Twelve),
            other => Err(RequestValidationError::InvalidMonths(other)),
        }
    }
}

impl From<PremiumMonths> for u32 {
    fn from(value: PremiumMonths) -> Self {
        value.get()
    }
}

impl std::fmt::Display for PremiumMonths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Field-level rejection of a caller request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("quantity must be between 50 and 1,000,000, got {0}")]
    QuantityOutOfRange(u32),
    #[error("months must be 3, 6, or 12, got {0}")]
    InvalidMonths(u32),
}

fn require(field: &'static str, value: &str) -> Result<(), RequestValidationError> {
    if value.trim().is_empty() {
        return Err(RequestValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn check_quantity(quantity: u32) -> Result<(), RequestValidationError> {
    if !(MIN_STAR_QUANTITY..=MAX_STAR_QUANTITY).contains(&quantity) {
        return Err(RequestValidationError::QuantityOutOfRange(quantity));
    }
    Ok(())
}

pub(crate) fn require_username(username: &str) -> Result<(), RequestValidationError> {
    require("username", username)
}

/// Request body for creating a star gift order.
///
/// Sent by callers to the gateway and forwarded verbatim to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateStarOrderRequest {
    pub username: String,
    pub recipient_hash: String,
    pub quantity: u32,
    pub wallet_type: String,
}

impl CreateStarOrderRequest {
    /// Check every field before the request leaves the gateway.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        require("username", &self.username)?;
        require("recipient_hash", &self.recipient_hash)?;
        check_quantity(self.quantity)?;
        require("wallet_type", &self.wallet_type)
    }
}

/// Request body for creating a premium subscription gift order.
///
/// `months` is typed, so a body with any other month count fails to
/// deserialize and never reaches the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatePremiumOrderRequest {
    pub username: String,
    pub recipient_hash: String,
    pub months: PremiumMonths,
    pub wallet_type: String,
}

impl CreatePremiumOrderRequest {
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        require("username", &self.username)?;
        require("recipient_hash", &self.recipient_hash)?;
        require("wallet_type", &self.wallet_type)
    }
}

/// Provider response to a star order creation call.
///
/// Identifiers and timestamps are kept as the raw strings the provider
/// sent; the order service parses them strictly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarOrderResponse {
    pub order_id: String,
    pub status: String,
    pub username: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// Provider response to a premium order creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumOrderResponse {
    pub order_id: String,
    pub status: String,
    pub username: String,
    pub months: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}
