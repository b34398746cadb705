//! SDK for the iStar gift gateway.
//!
//! Holds the wire objects exchanged with the upstream provider, the
//! signature and API-key helpers shared by the server and its clients, and
//! (behind the `client` feature) the typed upstream HTTP client.

#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod objects;
pub mod signature;

pub use error::ErrorKind;
