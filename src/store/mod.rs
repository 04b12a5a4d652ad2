//! # Cart Reconciliation Store
//!
//! [`CartStore`] keeps a local [`CartSnapshot`] consistent with a remote
//! [`CartService`]. Reads are synchronous and computed from the snapshot; writes go to the
//! service and are reconciled in one of three ways:
//!
//! | Operation | Local change | On success | On failure |
//! |-----------|--------------|------------|------------|
//! | [`fetch`](CartStore::fetch) | none | replace snapshot | keep snapshot |
//! | [`add`](CartStore::add) | none | refetch | notify |
//! | [`update`](CartStore::update) | none | refetch | notify (validation may be quiet) |
//! | [`remove`](CartStore::remove) | none | drop line locally | notify |
//! | [`clear`](CartStore::clear) | none | empty snapshot | notify |
//! | [`toggle_select`](CartStore::toggle_select) | flip flag first | keep flip | roll back, notify |
//! | [`select_all`](CartStore::select_all) | set every flag first | keep | refetch, notify |
//! | [`remove_selected_items`](CartStore::remove_selected_items) | none | refetch | log only |
//!
//! ## Concurrency
//!
//! Methods take `&self`, so a caller may issue a second toggle before the first one
//! resolves. State lives behind a mutex that is only held between awaits, never across one.
//! Same-line selection flips are tracked with tickets (see the `selection` module) so that responses
//! arriving out of order settle on the last response without corrupting the flag.
//!
//! A [`fetch`](CartStore::fetch) whose response lands after an optimistic flip overwrites
//! that flip. This race is accepted: the fetched state is the server's. The flip stays
//! lost even after its own confirmation arrives, since that confirmation only updates the
//! pending entry the fetch left in place. The next fetch picks up the server's value.

pub mod error;
pub mod notify;
pub(crate) mod selection;

pub use error::*;
pub use notify::*;

use crate::config::CartConfig;
use crate::model::{CartLine, CartLineId, CartLinePatch, CartSnapshot, NewCartLine, SkuId};
use crate::service::{CartService, ServiceError};
use futures::future::join_all;
use parking_lot::Mutex;
use selection::PendingSelections;
use tracing::{debug, info, instrument, warn};

/// Outcome of [`CartStore::remove_selected_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub attempted: usize,
    pub removed: usize,
    /// Lines whose deletion failed, usually because order creation already consumed them.
    pub failed: Vec<CartLineId>,
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: CartSnapshot,
    fetches_in_flight: usize,
    pending: PendingSelections,
}

/// Client-side cart state reconciled against a [`CartService`].
///
/// The store is an ordinary value: build one per cart and share it by reference or `Arc`.
#[derive(Debug)]
pub struct CartStore<S, N = TracingNotifier> {
    service: S,
    notifier: N,
    quiet_validation: bool,
    state: Mutex<StoreState>,
}

impl StoreState {
    fn settle_success(&mut self, id: CartLineId, ticket: u64, selected: bool) {
        if let Some(value) = self.pending.succeed(id, ticket, selected) {
            if let Some(line) = self.snapshot.get_mut(id) {
                debug!(%id, value, "Late response applied");
                line.selected = value;
            }
        }
    }
}

/// Clears the loading flag for one fetch when dropped.
struct LoadingGuard<'a> {
    state: &'a Mutex<StoreState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
    }
}

impl<S: CartService, N: Notifier> CartStore<S, N> {
    /// Creates an empty store. Validation-class update failures are not notified.
    pub fn new(service: S, notifier: N) -> Self {
        Self {
            service,
            notifier,
            quiet_validation: true,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn from_config(service: S, notifier: N, config: &CartConfig) -> Self {
        Self::new(service, notifier).with_quiet_validation(config.quiet_validation)
    }

    pub fn with_quiet_validation(mut self, quiet: bool) -> Self {
        self.quiet_validation = quiet;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    // --- Reads ---

    pub fn snapshot(&self) -> CartSnapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.lock().snapshot.lines().to_vec()
    }

    pub fn line(&self, id: CartLineId) -> Option<CartLine> {
        self.state.lock().snapshot.get(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().fetches_in_flight > 0
    }

    /// Whether a selection flip for `id` is still waiting on the server.
    pub fn is_pending(&self, id: CartLineId) -> bool {
        self.state.lock().pending.is_pending(id)
    }

    pub fn count(&self) -> u64 {
        self.state.lock().snapshot.count()
    }

    pub fn selected_count(&self) -> usize {
        self.state.lock().snapshot.selected_count()
    }

    pub fn selected_total(&self) -> f64 {
        self.state.lock().snapshot.selected_total()
    }

    pub fn all_selected(&self) -> bool {
        self.state.lock().snapshot.all_selected()
    }

    pub fn has_selection(&self) -> bool {
        self.state.lock().snapshot.has_selection()
    }

    /// The lines a checkout would order, in cart order.
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.state.lock().snapshot.selected_lines()
    }

    // --- Writes ---

    /// Replaces the snapshot with the server's lines.
    ///
    /// On failure, or when the service answers without a listing, the previous snapshot
    /// is kept. The loading flag is raised for the
    /// duration and lowered exactly once, whatever the outcome.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), CartError> {
        let _loading = self.begin_loading();
        let listing = self.service.list().await.map_err(|e| {
            warn!(error = %e, "Fetch failed");
            e
        })?;
        let Some(listing) = listing else {
            debug!("No listing in response, keeping snapshot");
            return Ok(());
        };

        let mut state = self.state.lock();
        state.pending.reconcile(&listing.items);
        state.snapshot.replace(listing.items);
        info!(size = state.snapshot.len(), "Fetched");
        Ok(())
    }

    /// Adds `quantity` units of a SKU, then refetches to pick up the server's line.
    #[instrument(skip(self))]
    pub async fn add(&self, sku_id: SkuId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let line = NewCartLine { sku_id, quantity };
        debug!(?line, "Adding");

        if let Err(e) = self.service.create(line).await {
            warn!(error = %e, "Add failed");
            self.notify_failure(&e, notify::OPERATION_FAILED);
            return Err(e.into());
        }

        self.fetch().await?;
        self.notifier.notify(notify::ADDED);
        Ok(())
    }

    /// Sends the fields set in `patch`, then refetches so server-side pricing applies.
    ///
    /// An empty patch is a no-op: nothing is sent and nothing changes.
    #[instrument(skip(self))]
    pub async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), CartError> {
        if patch.is_empty() {
            debug!("Empty patch, nothing to send");
            return Ok(());
        }
        if patch.quantity == Some(0) {
            return Err(CartError::InvalidQuantity(0));
        }

        match self.service.update(id, patch).await {
            Ok(()) => {
                self.fetch().await?;
                info!("Updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Update failed");
                if self.quiet_validation && e.is_validation() {
                    debug!("Validation failure kept quiet");
                } else {
                    self.notify_failure(&e, notify::UPDATE_FAILED);
                }
                Err(e.into())
            }
        }
    }

    /// Deletes a line and drops it from the snapshot without refetching.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: CartLineId) -> Result<(), CartError> {
        if let Err(e) = self.service.delete(id).await {
            warn!(error = %e, "Delete failed");
            self.notify_failure(&e, notify::DELETE_FAILED);
            return Err(e.into());
        }

        {
            let mut state = self.state.lock();
            state.snapshot.remove(id);
            state.pending.forget(id);
            info!(size = state.snapshot.len(), "Removed");
        }
        self.notifier.notify(notify::REMOVED);
        Ok(())
    }

    /// Empties the cart on the server and locally.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        if let Err(e) = self.service.clear().await {
            warn!(error = %e, "Clear failed");
            self.notify_failure(&e, notify::OPERATION_FAILED);
            return Err(e.into());
        }

        {
            let mut state = self.state.lock();
            state.snapshot.clear();
            state.pending.clear();
        }
        info!("Cleared");
        self.notifier.notify(notify::CLEARED);
        Ok(())
    }

    /// Flips the selection of one line immediately, then persists it.
    ///
    /// Returns the new flag. If the server refuses, the flag is rolled back (unless a newer
    /// flip of the same line is in flight) and one failure notification is shown.
    #[instrument(skip(self))]
    pub async fn toggle_select(&self, id: CartLineId) -> Result<bool, CartError> {
        let (selected, ticket) = {
            let mut state = self.state.lock();
            let StoreState {
                snapshot, pending, ..
            } = &mut *state;
            let line = snapshot.get_mut(id).ok_or(CartError::LineNotFound(id))?;
            let prior = line.selected;
            line.selected = !prior;
            (line.selected, pending.begin(id, prior))
        };
        debug!(selected, ticket, "Flipped locally");

        match self.service.update(id, CartLinePatch::selected(selected)).await {
            Ok(()) => {
                self.state.lock().settle_success(id, ticket, selected);
                info!(selected, "Selection confirmed");
                Ok(selected)
            }
            Err(e) => {
                let restored = {
                    let mut state = self.state.lock();
                    let restored = state.pending.fail(id, ticket);
                    if let (Some(value), Some(line)) = (restored, state.snapshot.get_mut(id)) {
                        line.selected = value;
                    }
                    restored
                };
                warn!(error = %e, ?restored, "Selection failed");
                self.notify_failure(&e, notify::UPDATE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Sets every line's selection immediately, then persists each line concurrently.
    ///
    /// When any line fails, the snapshot is refetched to recover the server's state and the
    /// user is told the selection only partially applied.
    #[instrument(skip(self))]
    pub async fn select_all(&self, selected: bool) -> Result<(), CartError> {
        let tickets = {
            let mut state = self.state.lock();
            let StoreState {
                snapshot, pending, ..
            } = &mut *state;
            let tickets: Vec<(CartLineId, u64)> = snapshot
                .lines()
                .iter()
                .map(|line| (line.id, pending.begin(line.id, line.selected)))
                .collect();
            snapshot.set_all_selected(selected);
            tickets
        };
        if tickets.is_empty() {
            return Ok(());
        }
        let total = tickets.len();

        let results = join_all(tickets.into_iter().map(|(id, ticket)| async move {
            let result = self.service.update(id, CartLinePatch::selected(selected)).await;
            (id, ticket, result)
        }))
        .await;

        let mut failed = 0;
        let mut rollbacks = Vec::new();
        {
            let mut state = self.state.lock();
            for (id, ticket, result) in results {
                match result {
                    Ok(()) => state.settle_success(id, ticket, selected),
                    Err(e) => {
                        warn!(%id, error = %e, "Selection update failed");
                        failed += 1;
                        if let Some(value) = state.pending.fail(id, ticket) {
                            rollbacks.push((id, value));
                        }
                    }
                }
            }
        }
        if failed == 0 {
            info!(total, "Selection applied");
            return Ok(());
        }

        if let Err(e) = self.fetch().await {
            warn!(error = %e, "Recovery fetch failed, rolling back failed lines locally");
            let mut state = self.state.lock();
            for (id, value) in rollbacks {
                if let Some(line) = state.snapshot.get_mut(id) {
                    line.selected = value;
                }
            }
        }
        self.notifier.notify(notify::SELECTION_PARTIAL);
        Err(CartError::PartialSelection { failed, total })
    }

    /// Deletes every selected line after an order has been placed.
    ///
    /// A line that fails to delete was most likely consumed by order creation already, so
    /// failures are logged and never notified or returned. The snapshot is refetched
    /// afterwards, and one notification is shown if anything was removed.
    #[instrument(skip(self))]
    pub async fn remove_selected_items(&self) -> Result<CleanupReport, CartError> {
        let ids = self.state.lock().snapshot.selected_ids();
        if ids.is_empty() {
            return Ok(CleanupReport::default());
        }

        let mut report = CleanupReport {
            attempted: ids.len(),
            ..CleanupReport::default()
        };
        for id in ids {
            if self.delete_silently(id).await {
                report.removed += 1;
            } else {
                report.failed.push(id);
            }
        }

        self.fetch().await?;
        if report.removed > 0 {
            self.notifier.notify(notify::CART_UPDATED);
        }
        info!(
            attempted = report.attempted,
            removed = report.removed,
            "Checkout cleanup finished"
        );
        Ok(report)
    }

    async fn delete_silently(&self, id: CartLineId) -> bool {
        match self.service.delete(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%id, error = %e, "Silent delete failed, line may already be gone");
                false
            }
        }
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.state.lock().fetches_in_flight += 1;
        LoadingGuard { state: &self.state }
    }

    fn notify_failure(&self, error: &ServiceError, fallback: &str) {
        let message = match error {
            ServiceError::Api { message, .. }
                if message.as_deref().map_or(true, |m| m.trim().is_empty()) =>
            {
                fallback.to_string()
            }
            _ => error.user_message(),
        };
        self.notifier.notify(&message);
    }
}
