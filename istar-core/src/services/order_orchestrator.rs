//! OrderOrchestrator service.
//!
//! For every order creation the orchestrator:
//! - Calls the matching upstream endpoint
//! - Parses the provider's timestamps and order id
//! - Settles the status (`pending` for async, terminal for sync)
//! - Persists the resulting `Order` through the `OrderStore`
//!
//! Nothing is retried and nothing is compensated at the provider: a store
//! failure after a successful upstream call is reported as an internal error.

use std::sync::Arc;

use istar_sdk::client::UpstreamClient;
use istar_sdk::objects::{
    CreatePremiumOrderRequest, CreateStarOrderRequest, OrderStatus, PremiumMonths,
    PremiumOrderResponse, StarOrderResponse,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::GatewayError;
use crate::entities::{Order, OrderItem};
use crate::store::OrderStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Async,
    Sync,
}

/// Provider fields shared by star and premium order responses.
struct ProviderOrder<'a> {
    order_id: &'a str,
    status: &'a str,
    amount: Decimal,
    created_at: &'a str,
    completed_at: Option<&'a str>,
    tx_hash: Option<&'a str>,
}

impl<'a> From<&'a StarOrderResponse> for ProviderOrder<'a> {
    fn from(r: &'a StarOrderResponse) -> Self {
        Self {
            order_id: &r.order_id,
            status: &r.status,
            amount: r.amount,
            created_at: &r.created_at,
            completed_at: r.completed_at.as_deref(),
            tx_hash: r.tx_hash.as_deref(),
        }
    }
}

impl<'a> From<&'a PremiumOrderResponse> for ProviderOrder<'a> {
    fn from(r: &'a PremiumOrderResponse) -> Self {
        Self {
            order_id: &r.order_id,
            status: &r.status,
            amount: r.amount,
            created_at: &r.created_at,
            completed_at: r.completed_at.as_deref(),
            tx_hash: r.tx_hash.as_deref(),
        }
    }
}

/// Caller fields carried unchanged onto the order.
struct Recipient<'a> {
    username: &'a str,
    recipient_hash: &'a str,
    wallet_type: &'a str,
}

/// Creates orders at the provider and records them in the order store.
#[derive(Clone)]
pub struct OrderOrchestrator {
    upstream: Arc<UpstreamClient>,
    store: Arc<dyn OrderStore>,
}

impl OrderOrchestrator {
    pub fn new(upstream: Arc<UpstreamClient>, store: Arc<dyn OrderStore>) -> Self {
        Self { upstream, store }
    }

    /// Create a star order that the provider settles later via webhook.
    pub async fn create_star_order_async(
        &self,
        request: &CreateStarOrderRequest,
    ) -> Result<Order, GatewayError> {
        let response = self
            .upstream
            .create_star_order_async(request)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create star order upstream"))?;
        let item = OrderItem::Star {
            quantity: response.quantity,
        };
        self.record(
            item,
            Recipient::from_star(request),
            (&response).into(),
            Settlement::Async,
        )
        .await
    }

    /// Create a star order and record the terminal status the provider
    /// reported.
    pub async fn create_star_order_sync(
        &self,
        request: &CreateStarOrderRequest,
    ) -> Result<Order, GatewayError> {
        let response = self
            .upstream
            .create_star_order_sync(request)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create star order upstream"))?;
        let item = OrderItem::Star {
            quantity: response.quantity,
        };
        self.record(
            item,
            Recipient::from_star(request),
            (&response).into(),
            Settlement::Sync,
        )
        .await
    }

    /// Create a premium order that the provider settles later via webhook.
    pub async fn create_premium_order_async(
        &self,
        request: &CreatePremiumOrderRequest,
    ) -> Result<Order, GatewayError> {
        let response = self
            .upstream
            .create_premium_order_async(request)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create premium order upstream"))?;
        let item = OrderItem::Premium {
            months: provider_months(response.months)?,
        };
        self.record(
            item,
            Recipient::from_premium(request),
            (&response).into(),
            Settlement::Async,
        )
        .await
    }

    /// Create a premium order and record the terminal status the provider
    /// reported.
    pub async fn create_premium_order_sync(
        &self,
        request: &CreatePremiumOrderRequest,
    ) -> Result<Order, GatewayError> {
        let response = self
            .upstream
            .create_premium_order_sync(request)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create premium order upstream"))?;
        let item = OrderItem::Premium {
            months: provider_months(response.months)?,
        };
        self.record(
            item,
            Recipient::from_premium(request),
            (&response).into(),
            Settlement::Sync,
        )
        .await
    }

    async fn record(
        &self,
        item: OrderItem,
        recipient: Recipient<'_>,
        provider: ProviderOrder<'_>,
        settlement: Settlement,
    ) -> Result<Order, GatewayError> {
        let order = build_order(item, recipient, provider, settlement)?;

        self.store.create_order(&order).await.inspect_err(|e| {
            error!(order_id = %order.id, error = %e, "Failed to save order");
        })?;

        match settlement {
            Settlement::Async => {
                info!(order_id = %order.id, order_type = %order.order_type(), "Order created (async)")
            }
            Settlement::Sync => {
                info!(
                    order_id = %order.id,
                    order_type = %order.order_type(),
                    status = %order.status,
                    "Order created (sync)"
                )
            }
        }
        Ok(order)
    }
}

impl<'a> Recipient<'a> {
    fn from_star(request: &'a CreateStarOrderRequest) -> Self {
        Self {
            username: &request.username,
            recipient_hash: &request.recipient_hash,
            wallet_type: &request.wallet_type,
        }
    }

    fn from_premium(request: &'a CreatePremiumOrderRequest) -> Self {
        Self {
            username: &request.username,
            recipient_hash: &request.recipient_hash,
            wallet_type: &request.wallet_type,
        }
    }
}

fn build_order(
    item: OrderItem,
    recipient: Recipient<'_>,
    provider: ProviderOrder<'_>,
    settlement: Settlement,
) -> Result<Order, GatewayError> {
    let created_at = parse_timestamp("created_at", provider.created_at)?;

    let (status, completed_at, updated_at) = match settlement {
        Settlement::Async => (OrderStatus::Pending, None, created_at),
        Settlement::Sync => {
            let now = OffsetDateTime::now_utc();
            let completed_at = match provider.completed_at {
                Some(raw) => parse_timestamp("completed_at", raw)?,
                None => now,
            };
            (settle_status(provider.status), Some(completed_at), now)
        }
    };

    let id = Uuid::parse_str(provider.order_id).map_err(|e| {
        error!(order_id = provider.order_id, error = %e, "Invalid order_id from provider");
        GatewayError::internal("invalid order_id")
    })?;

    let tx_hash = match settlement {
        Settlement::Async => None,
        Settlement::Sync => provider.tx_hash.map(str::to_owned),
    };

    Ok(Order {
        id,
        item,
        status,
        username: recipient.username.to_owned(),
        recipient_hash: recipient.recipient_hash.to_owned(),
        amount: provider.amount,
        wallet_type: recipient.wallet_type.to_owned(),
        tx_hash,
        created_at,
        updated_at,
        completed_at,
        error_message: None,
    })
}

/// A synchronous order must come back terminal; anything else is recorded
/// as failed.
fn settle_status(raw: &str) -> OrderStatus {
    match raw.parse::<OrderStatus>() {
        Ok(status) if status.is_terminal() => status,
        _ => {
            warn!(status = raw, "Unexpected status from provider, recording order as failed");
            OrderStatus::Failed
        }
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<OffsetDateTime, GatewayError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| {
        error!(field, value = raw, error = %e, "Failed to parse provider timestamp");
        GatewayError::internal(format!("invalid {field} timestamp"))
    })
}

fn provider_months(months: u32) -> Result<PremiumMonths, GatewayError> {
    PremiumMonths::try_from(months).map_err(|e| {
        error!(months, error = %e, "Provider returned an unsupported premium length");
        GatewayError::internal("invalid months")
    })
}
