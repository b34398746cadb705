//! Wire objects exchanged with the upstream provider and the gateway's callers.

pub mod order;
pub mod search;
pub mod webhook;

pub use order::{
    CreatePremiumOrderRequest, CreateStarOrderRequest, MAX_STAR_QUANTITY, MIN_STAR_QUANTITY,
    OrderStatus, OrderType, PremiumMonths, PremiumOrderResponse, RequestValidationError,
    StarOrderResponse, UnknownOrderStatus,
};
pub use search::{PremiumRecipientQuery, StarRecipientQuery};
pub use webhook::{WebhookOrder, WebhookPayload};
