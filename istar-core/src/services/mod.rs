//! Gateway services.
//!
//! - `OrderOrchestrator`: creates orders at the provider and records them
//! - `WebhookReconciler`: applies provider status callbacks to stored orders

pub mod order_orchestrator;
pub mod webhook_reconciler;

pub use order_orchestrator::OrderOrchestrator;
pub use webhook_reconciler::WebhookReconciler;
