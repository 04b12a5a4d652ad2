//! # Cart Service Messages
//!
//! Requests the [`ChannelCartService`](crate::service::ChannelCartService) sends to a
//! [`CartServiceActor`](crate::service::CartServiceActor). Each request carries a one-shot
//! channel; the actor answers with an [`Envelope`], exactly as the REST backend would.

use crate::model::{CartLineId, CartLinePatch, CartListing, NewCartLine};
use crate::service::envelope::Envelope;
use tokio::sync::oneshot;

/// Type alias for the one-shot reply channel used by the service actor.
pub type Reply<T> = oneshot::Sender<Envelope<T>>;

/// Internal message type sent to the service actor.
///
/// The variants map one-to-one onto the cart endpoints:
///
/// - **List**: `GET /api/v1/cart`
/// - **Create**: `POST /api/v1/cart/items`
/// - **Update**: `PATCH /api/v1/cart/items/{id}`
/// - **Delete**: `DELETE /api/v1/cart/items/{id}`
/// - **Clear**: `POST /api/v1/cart/clear`
#[derive(Debug)]
pub enum CartRequest {
    List {
        respond_to: Reply<CartListing>,
    },
    Create {
        line: NewCartLine,
        respond_to: Reply<()>,
    },
    Update {
        id: CartLineId,
        patch: CartLinePatch,
        respond_to: Reply<()>,
    },
    Delete {
        id: CartLineId,
        respond_to: Reply<()>,
    },
    Clear {
        respond_to: Reply<()>,
    },
}

impl CartRequest {
    /// Short name of the endpoint, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CartRequest::List { .. } => "list",
            CartRequest::Create { .. } => "create",
            CartRequest::Update { .. } => "update",
            CartRequest::Delete { .. } => "delete",
            CartRequest::Clear { .. } => "clear",
        }
    }
}
