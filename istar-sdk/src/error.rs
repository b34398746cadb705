//! The error taxonomy shared by every layer of the gateway.

/// Coarse classification of a failure.
///
/// Each layer keeps its own error enum, but every one of them can be
/// reduced to one of these kinds, which in turn decides the HTTP status
/// code returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input.
    Validation,
    /// Bad or missing credential or signature.
    Unauthorized,
    /// The referenced resource does not exist.
    NotFound,
    /// Anything unexpected: network, decode, parse or store failures.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code this kind maps to.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}
