//! # Channel Client
//!
//! The client half of the in-process cart service.

use crate::model::{CartLineId, CartLinePatch, CartListing, NewCartLine};
use crate::service::envelope::Envelope;
use crate::service::error::ServiceError;
use crate::service::message::{CartRequest, Reply};
use crate::service::CartService;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A [`CartService`] that forwards every call to a
/// [`CartServiceActor`](crate::service::CartServiceActor) over a Tokio mpsc channel and
/// waits for the envelope on a oneshot channel.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Transport semantics** – a closed actor or a dropped reply is reported as
///   [`ServiceError::Transport`], the same way a refused HTTP connection would be.
#[derive(Clone, Debug)]
pub struct ChannelCartService {
    sender: mpsc::Sender<CartRequest>,
}

impl ChannelCartService {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> CartRequest,
    ) -> Result<Option<T>, ServiceError> {
        let (respond_to, response) = oneshot::channel::<Envelope<T>>();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ServiceError::Transport("cart service closed".to_string()))?;
        response
            .await
            .map_err(|_| ServiceError::Transport("cart service dropped the reply".to_string()))?
            .into_data()
    }
}

#[async_trait]
impl CartService for ChannelCartService {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Option<CartListing>, ServiceError> {
        debug!("Sending request");
        self.call(|respond_to| CartRequest::List { respond_to }).await
    }

    #[instrument(skip(self))]
    async fn create(&self, line: NewCartLine) -> Result<(), ServiceError> {
        debug!("Sending request");
        self.call(|respond_to| CartRequest::Create { line, respond_to })
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), ServiceError> {
        debug!("Sending request");
        self.call(|respond_to| CartRequest::Update {
            id,
            patch,
            respond_to,
        })
        .await
        .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CartLineId) -> Result<(), ServiceError> {
        debug!("Sending request");
        self.call(|respond_to| CartRequest::Delete { id, respond_to })
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), ServiceError> {
        debug!("Sending request");
        self.call(|respond_to| CartRequest::Clear { respond_to })
            .await
            .map(|_| ())
    }
}
