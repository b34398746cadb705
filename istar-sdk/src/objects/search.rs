//! Query parameters for the recipient search endpoints.
//!
//! Both endpoints are passed through to the provider unchanged once the
//! parameters have been checked here.

use serde::{Deserialize, Serialize};

use super::order::{PremiumMonths, RequestValidationError, check_quantity, require_username};

/// `GET /star/recipient/search` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRecipientQuery {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub quantity: u32,
}

impl StarRecipientQuery {
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        require_username(&self.username)?;
        check_quantity(self.quantity)
    }
}

/// `GET /premium/recipient/search` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumRecipientQuery {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub months: u32,
}

impl PremiumRecipientQuery {
    /// Check the parameters and return the typed month count.
    pub fn validate(&self) -> Result<PremiumMonths, RequestValidationError> {
        require_username(&self.username)?;
        PremiumMonths::try_from(self.months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_username() {
        let query = StarRecipientQuery {
            username: String::new(),
            quantity: 100,
        };
        assert_eq!(
            query.validate(),
            Err(RequestValidationError::MissingField("username"))
        );
    }

    #[test]
    fn test_missing_quantity_defaults_to_out_of_range() {
        let query: StarRecipientQuery =
            serde_json::from_value(serde_json::json!({ "username": "alice" })).unwrap();
        assert_eq!(
            query.validate(),
            Err(RequestValidationError::QuantityOutOfRange(0))
        );
    }

    #[test]
    fn test_premium_months() {
        let query = PremiumRecipientQuery {
            username: "bob".to_string(),
            months: 6,
        };
        assert_eq!(query.validate(), Ok(PremiumMonths::Six));

        let query = PremiumRecipientQuery {
            username: "bob".to_string(),
            months: 7,
        };
        assert_eq!(
            query.validate(),
            Err(RequestValidationError::InvalidMonths(7))
        );
    }
}
