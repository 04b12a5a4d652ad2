//! The remote cart service: the single source of truth the store reconciles against.
//!
//! # Structure
//!
//! - [`CartService`] - the seam the store depends on (list / create / update / delete / clear)
//! - [`envelope`] - the `{code, message, data}` wire wrapper and its success rule
//! - [`error`] - [`ServiceError`], transport vs. application failures
//! - [`http`] - [`HttpCartService`], the REST adapter used against a real backend
//! - [`actor`] / [`client`] - an in-process cart service running as a Tokio task, and the
//!   channel client that talks to it
//! - [`mock`] - expectation-based doubles for tests
//!
//! Every implementation treats a non-zero envelope code and a transport failure the same way
//! (an `Err`), but keeps the distinguishing message for user notification.

pub mod actor;
pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod message;
pub mod mock;

pub use actor::CartServiceActor;
pub use catalog::{Catalog, CatalogEntry};
pub use client::ChannelCartService;
pub use envelope::Envelope;
pub use error::*;
pub use http::HttpCartService;

use crate::model::{CartLineId, CartLinePatch, CartListing, NewCartLine};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the remote cart service exposes.
///
/// Mutating operations return `()` on success: the store either trusts its own local
/// change or refetches the listing to pick up server-computed fields.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Fetch every line currently in the cart.
    ///
    /// `Ok(None)` means the service succeeded without sending a listing.
    async fn list(&self) -> Result<Option<CartListing>, ServiceError>;

    /// Add `quantity` units of a SKU.
    async fn create(&self, line: NewCartLine) -> Result<(), ServiceError>;

    /// Apply a partial update to one line.
    async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), ServiceError>;

    /// Remove one line.
    async fn delete(&self, id: CartLineId) -> Result<(), ServiceError>;

    /// Remove every line.
    async fn clear(&self) -> Result<(), ServiceError>;
}

#[async_trait]
impl<S: CartService + ?Sized> CartService for Arc<S> {
    async fn list(&self) -> Result<Option<CartListing>, ServiceError> {
        (**self).list().await
    }

    async fn create(&self, line: NewCartLine) -> Result<(), ServiceError> {
        (**self).create(line).await
    }

    async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), ServiceError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: CartLineId) -> Result<(), ServiceError> {
        (**self).delete(id).await
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        (**self).clear().await
    }
}
