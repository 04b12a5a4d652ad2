//! # In-Process Cart Service
//!
//! This module defines the `CartServiceActor`, an in-memory stand-in for the REST cart
//! backend. It owns the cart lines and processes requests sequentially, so it needs no
//! locking and gives the store the same contract the real backend does: server-assigned
//! ids, server-computed totals, persisted selection and `{code, message, data}` envelopes.

use crate::model::{CartLine, CartLineId, CartLinePatch, CartListing, NewCartLine, SkuId};
use crate::service::catalog::Catalog;
use crate::service::client::ChannelCartService;
use crate::service::envelope::Envelope;
use crate::service::error::VALIDATION_CODE;
use crate::service::message::CartRequest;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Envelope code for unknown lines or SKUs.
pub const NOT_FOUND_CODE: i64 = 404;

/// The actor that plays the remote cart service.
///
/// **Concurrency Model**:
/// Requests are handled one at a time in [`run`](Self::run). Many clients may send
/// concurrently, but the line table is only ever touched from the actor's own task.
///
/// # Pricing rules
///
/// * `total_price` is always `unit_price * quantity` of the line's current SKU.
/// * Adding a SKU that already has a line merges into that line.
/// * Zero quantities are rejected with code 422, unknown ids or SKUs with code 404.
pub struct CartServiceActor {
    receiver: mpsc::Receiver<CartRequest>,
    lines: Vec<CartLine>,
    catalog: Catalog,
    next_id: u64,
}

impl CartServiceActor {
    /// Creates a new actor and the client that talks to it.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the request channel. When it is full, callers wait.
    /// * `catalog` - SKUs the service accepts, with their prices.
    pub fn new(buffer_size: usize, catalog: Catalog) -> (Self, ChannelCartService) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            lines: Vec::new(),
            catalog,
            next_id: 1,
        };
        (actor, ChannelCartService::new(sender))
    }

    /// Runs the request loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(skus = self.catalog.len(), "Cart service started");

        while let Some(request) = self.receiver.recv().await {
            let kind = request.kind();
            match request {
                CartRequest::List { respond_to } => {
                    debug!(kind, size = self.lines.len(), "List");
                    let _ = respond_to.send(Envelope::ok(self.listing()));
                }
                CartRequest::Create { line, respond_to } => {
                    debug!(kind, ?line, "Create");
                    let _ = respond_to.send(self.create(line));
                }
                CartRequest::Update {
                    id,
                    patch,
                    respond_to,
                } => {
                    debug!(kind, %id, ?patch, "Update");
                    let _ = respond_to.send(self.update(id, patch));
                }
                CartRequest::Delete { id, respond_to } => {
                    debug!(kind, %id, "Delete");
                    let _ = respond_to.send(self.delete(id));
                }
                CartRequest::Clear { respond_to } => {
                    self.lines.clear();
                    info!(kind, "Cleared");
                    let _ = respond_to.send(Envelope::ok(()));
                }
            }
        }

        info!(size = self.lines.len(), "Cart service shutdown");
    }

    fn listing(&self) -> CartListing {
        CartListing {
            items: self.lines.clone(),
            amount_total: Some(self.lines.iter().map(|line| line.total_price).sum()),
        }
    }

    fn create(&mut self, params: NewCartLine) -> Envelope<()> {
        if params.quantity == 0 {
            warn!(sku_id = %params.sku_id, "Create rejected: zero quantity");
            return Envelope::failure(VALIDATION_CODE, "quantity must be at least 1");
        }
        let Some(entry) = self.catalog.get(params.sku_id).cloned() else {
            warn!(sku_id = %params.sku_id, "Create rejected: unknown SKU");
            return sku_not_found(params.sku_id);
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.sku_id == params.sku_id) {
            let Some(quantity) = line.quantity.checked_add(params.quantity) else {
                warn!(id = %line.id, "Create rejected: quantity overflow");
                return Envelope::failure(VALIDATION_CODE, "quantity too large");
            };
            line.quantity = quantity;
            line.total_price = line.unit_price * f64::from(line.quantity);
            info!(id = %line.id, quantity = line.quantity, "Merged into existing line");
            return Envelope::ok(());
        }

        let id = CartLineId(self.next_id);
        self.next_id += 1;
        self.lines.push(CartLine {
            id,
            sku_id: params.sku_id,
            title: entry.title,
            image: entry.image,
            color: entry.color,
            size: entry.size,
            unit_price: entry.unit_price,
            quantity: params.quantity,
            total_price: entry.unit_price * f64::from(params.quantity),
            selected: false,
        });
        info!(%id, size = self.lines.len(), "Created");
        Envelope::ok(())
    }

    fn update(&mut self, id: CartLineId, patch: CartLinePatch) -> Envelope<()> {
        if patch.quantity == Some(0) {
            warn!(%id, "Update rejected: zero quantity");
            return Envelope::failure(VALIDATION_CODE, "quantity must be at least 1");
        }
        let entry = match patch.sku_id {
            Some(sku_id) => match self.catalog.get(sku_id) {
                Some(entry) => Some((sku_id, entry.clone())),
                None => {
                    warn!(%id, %sku_id, "Update rejected: unknown SKU");
                    return sku_not_found(sku_id);
                }
            },
            None => None,
        };
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            warn!(%id, "Not found");
            return line_not_found(id);
        };

        if let Some((sku_id, entry)) = entry {
            line.sku_id = sku_id;
            line.title = entry.title;
            line.image = entry.image;
            line.color = entry.color;
            line.size = entry.size;
            line.unit_price = entry.unit_price;
        }
        if let Some(quantity) = patch.quantity {
            line.quantity = quantity;
        }
        if let Some(selected) = patch.selected {
            line.selected = selected;
        }
        line.total_price = line.unit_price * f64::from(line.quantity);
        info!(%id, "Updated");
        Envelope::ok(())
    }

    fn delete(&mut self, id: CartLineId) -> Envelope<()> {
        match self.lines.iter().position(|l| l.id == id) {
            Some(index) => {
                self.lines.remove(index);
                info!(%id, size = self.lines.len(), "Deleted");
                Envelope::ok(())
            }
            None => {
                warn!(%id, "Not found");
                line_not_found(id)
            }
        }
    }
}

fn line_not_found(id: CartLineId) -> Envelope<()> {
    Envelope::failure(NOT_FOUND_CODE, format!("Cart item not found: {id}"))
}

fn sku_not_found(sku_id: SkuId) -> Envelope<()> {
    Envelope::failure(NOT_FOUND_CODE, format!("SKU not found: {sku_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::catalog::CatalogEntry;
    use crate::service::{CartService, ServiceError};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_sku(7, CatalogEntry::new("Tee", 10.0).with_variant("black", "M"))
            .with_sku(8, CatalogEntry::new("Cap", 5.0))
    }

    fn start() -> ChannelCartService {
        let (actor, client) = CartServiceActor::new(8, catalog());
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn create_assigns_ids_and_prices() {
        let client = start();
        client.create(NewCartLine { sku_id: SkuId(7), quantity: 2 }).await.unwrap();
        client.create(NewCartLine { sku_id: SkuId(8), quantity: 1 }).await.unwrap();

        let listing = client.list().await.unwrap().unwrap();
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[0].id, CartLineId(1));
        assert_eq!(listing.items[0].total_price, 20.0);
        assert_eq!(listing.items[0].color.as_deref(), Some("black"));
        assert_eq!(listing.items[1].id, CartLineId(2));
        assert_eq!(listing.amount_total, Some(25.0));
    }

    #[tokio::test]
    async fn adding_same_sku_merges() {
        let client = start();
        client.create(NewCartLine { sku_id: SkuId(7), quantity: 1 }).await.unwrap();
        client.create(NewCartLine { sku_id: SkuId(7), quantity: 2 }).await.unwrap();

        let listing = client.list().await.unwrap().unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].quantity, 3);
        assert_eq!(listing.items[0].total_price, 30.0);
    }

    #[tokio::test]
    async fn merge_past_max_quantity_is_rejected() {
        let client = start();
        client
            .create(NewCartLine { sku_id: SkuId(7), quantity: u32::MAX })
            .await
            .unwrap();

        let err = client
            .create(NewCartLine { sku_id: SkuId(7), quantity: 1 })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "quantity too large");

        // The service is still running and the line is untouched
        let listing = client.list().await.unwrap().unwrap();
        assert_eq!(listing.items[0].quantity, u32::MAX);
    }

    #[tokio::test]
    async fn update_persists_selection_and_reprices() {
        let client = start();
        client.create(NewCartLine { sku_id: SkuId(7), quantity: 1 }).await.unwrap();

        client
            .update(
                CartLineId(1),
                CartLinePatch {
                    quantity: Some(4),
                    sku_id: Some(SkuId(8)),
                    selected: Some(true),
                },
            )
            .await
            .unwrap();

        let line = client.list().await.unwrap().unwrap().items.remove(0);
        assert_eq!(line.sku_id, SkuId(8));
        assert_eq!(line.title, "Cap");
        assert_eq!(line.total_price, 20.0);
        assert!(line.selected);
    }

    #[tokio::test]
    async fn rejects_bad_requests_with_codes() {
        let client = start();

        let err = client
            .create(NewCartLine { sku_id: SkuId(99), quantity: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api { code: NOT_FOUND_CODE, .. }));

        let err = client
            .create(NewCartLine { sku_id: SkuId(7), quantity: 0 })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = client.delete(CartLineId(42)).await.unwrap_err();
        assert_eq!(err.user_message(), "Cart item not found: line_42");

        let err = client
            .update(CartLineId(42), CartLinePatch::selected(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api { code: NOT_FOUND_CODE, .. }));
    }

    #[tokio::test]
    async fn closed_service_is_a_transport_failure() {
        let (actor, client) = CartServiceActor::new(8, catalog());
        drop(actor);
        let err = client.list().await.unwrap_err();
        assert!(err.is_transport());
    }
}
