use thiserror::Error;

/// Failures reported by the order store and the service on top of it.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No order with this id")]
    NotFound,
    /// Order data that violates a domain rule, such as a negative price.
    #[error("Invalid order data: {0}")]
    InvalidInput(String),
    /// The store itself failed, e.g. its lock was poisoned.
    #[error("Order store failure: {0}")]
    Internal(String),
}
