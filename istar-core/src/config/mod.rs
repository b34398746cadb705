//! Validated runtime configuration shared with the server crate.
//!
//! Loading and parsing the config file is the server's job; these types
//! only describe settings the core components act on.

mod webhook;

pub use webhook::WebhookVerification;
