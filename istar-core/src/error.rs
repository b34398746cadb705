//! Error taxonomy shared by the orchestrator and the reconciler.

use istar_sdk::ErrorKind;
use istar_sdk::client::ClientError;

use crate::store::StoreError;

/// Failure of a gateway operation.
///
/// Upstream errors keep the classification the client gave them; every
/// other internal failure carries a short context string for the logs.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::Unauthorized(_) => ErrorKind::Unauthorized,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::Internal(_) | GatewayError::Store(_) => ErrorKind::Internal,
            GatewayError::Upstream(e) => e.kind(),
        }
    }

    pub(crate) fn internal(context: impl Into<String>) -> Self {
        GatewayError::Internal(context.into())
    }
}
