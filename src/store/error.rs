//! Error types for the cart store.

use crate::model::CartLineId;
use crate::service::ServiceError;
use thiserror::Error;

/// Errors returned by [`CartStore`](crate::store::CartStore) operations.
///
/// Whenever one of these is returned, the store has either made no local change or has
/// already undone it (for a partial select-all: reloaded the server's state).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The remote cart service failed or refused the request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// No line with this id is in the local snapshot.
    #[error("Cart line not found: {0}")]
    LineNotFound(CartLineId),

    /// Lines must hold at least one unit; a line going to zero is deleted instead.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Some of the per-line updates of a select-all failed.
    #[error("Selection failed for {failed} of {total} lines")]
    PartialSelection { failed: usize, total: usize },
}

impl CartError {
    pub fn service(&self) -> Option<&ServiceError> {
        match self {
            CartError::Service(e) => Some(e),
            _ => None,
        }
    }
}
