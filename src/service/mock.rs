//! # Mock Cart Services & Testing Guide
//!
//! Two doubles for the remote cart service, mirroring the two ways store logic gets tested.
//!
//! | Double | Drives responses | Use Case |
//! |--------|------------------|----------|
//! | [`MockCartService`] | Queued expectations, answered immediately | Success/failure paths, call counting |
//! | [`create_mock_service`] + `expect_*` | The test answers each request by hand | Out-of-order completion, in-flight state |
//!
//! ## Pattern 0: Expectations
//!
//! ```rust
//! use cart_sync::model::{CartLine, CartLineId, CartLinePatch};
//! use cart_sync::service::mock::MockCartService;
//! use cart_sync::service::{CartService, ServiceError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockCartService::new();
//!     mock.expect_list().return_ok(vec![CartLine::new(1, 7, "Tee", 10.0, 1)]);
//!     mock.expect_update(CartLineId(1))
//!         .return_err(ServiceError::Transport("timeout".into()));
//!
//!     assert_eq!(mock.list().await.unwrap().unwrap().items.len(), 1);
//!     assert!(mock.update(CartLineId(1), CartLinePatch::selected(true)).await.is_err());
//!     mock.verify();
//! }
//! ```
//!
//! ## Pattern 1: Hand-driven replies
//!
//! The channel helpers hand the test each request together with its reply sender, so
//! a test can hold two replies and answer the second one first.
//!
//! ```rust
//! use cart_sync::model::{CartLineId, CartLinePatch};
//! use cart_sync::service::mock::{create_mock_service, expect_update};
//! use cart_sync::service::{CartService, Envelope};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (service, mut receiver) = create_mock_service(8);
//!     let call = tokio::spawn(async move {
//!         service.update(CartLineId(1), CartLinePatch::selected(true)).await
//!     });
//!
//!     let (id, patch, reply) = expect_update(&mut receiver).await.unwrap();
//!     assert_eq!(id, CartLineId(1));
//!     assert_eq!(patch.selected, Some(true));
//!     reply.send(Envelope::ok(())).unwrap();
//!
//!     assert!(call.await.unwrap().is_ok());
//! }
//! ```

use crate::model::{CartLine, CartLineId, CartLinePatch, CartListing, NewCartLine};
use crate::service::client::ChannelCartService;
use crate::service::error::ServiceError;
use crate::service::message::{CartRequest, Reply};
use crate::service::CartService;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A queued response for one expected request.
#[derive(Debug)]
enum Expectation {
    List(Result<Option<CartListing>, ServiceError>),
    Create(Result<(), ServiceError>),
    Update {
        id: CartLineId,
        response: Result<(), ServiceError>,
    },
    Delete {
        id: CartLineId,
        response: Result<(), ServiceError>,
    },
    Clear(Result<(), ServiceError>),
}

impl Expectation {
    fn matches(&self, call: &MockCall) -> bool {
        match (self, call) {
            (Expectation::List(_), MockCall::List)
            | (Expectation::Create(_), MockCall::Create(_))
            | (Expectation::Clear(_), MockCall::Clear) => true,
            (Expectation::Update { id, .. }, MockCall::Update(call_id, _))
            | (Expectation::Delete { id, .. }, MockCall::Delete(call_id)) => id == call_id,
            _ => false,
        }
    }
}

/// A request the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    List,
    Create(NewCartLine),
    Update(CartLineId, CartLinePatch),
    Delete(CartLineId),
    Clear,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<MockCall>,
}

/// A [`CartService`] answered from queued expectations.
///
/// List, create and clear expectations are consumed in order. Update and delete
/// expectations are matched by line id, so concurrent fan-out may arrive in any order.
/// A request with no matching expectation panics, failing the test.
///
/// Clones share the same queue, so one clone can go into the store under test while the
/// test keeps another for [`verify`](Self::verify) and [`calls`](Self::calls).
#[derive(Debug, Clone, Default)]
pub struct MockCartService {
    state: Arc<Mutex<MockState>>,
}

impl MockCartService {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_list(&self) -> ListExpectationBuilder {
        ListExpectationBuilder {
            state: self.state.clone(),
        }
    }

    pub fn expect_create(&self) -> MutationExpectationBuilder {
        MutationExpectationBuilder {
            kind: MutationKind::Create,
            state: self.state.clone(),
        }
    }

    pub fn expect_update(&self, id: CartLineId) -> MutationExpectationBuilder {
        MutationExpectationBuilder {
            kind: MutationKind::Update(id),
            state: self.state.clone(),
        }
    }

    pub fn expect_delete(&self, id: CartLineId) -> MutationExpectationBuilder {
        MutationExpectationBuilder {
            kind: MutationKind::Delete(id),
            state: self.state.clone(),
        }
    }

    pub fn expect_clear(&self) -> MutationExpectationBuilder {
        MutationExpectationBuilder {
            kind: MutationKind::Clear,
            state: self.state.clone(),
        }
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                state.expectations.len(),
                state.expectations
            );
        }
    }

    fn take(&self, call: MockCall) -> Expectation {
        let mut state = self.state.lock();
        let position = state.expectations.iter().position(|e| e.matches(&call));
        let expectation = position.and_then(|index| state.expectations.remove(index));
        match expectation {
            Some(expectation) => {
                state.calls.push(call);
                expectation
            }
            None => panic!("Unexpected request: {call:?}"),
        }
    }
}

#[async_trait]
impl CartService for MockCartService {
    async fn list(&self) -> Result<Option<CartListing>, ServiceError> {
        match self.take(MockCall::List) {
            Expectation::List(response) => response,
            other => panic!("Expectation mismatch: {other:?}"),
        }
    }

    async fn create(&self, line: NewCartLine) -> Result<(), ServiceError> {
        match self.take(MockCall::Create(line)) {
            Expectation::Create(response) => response,
            other => panic!("Expectation mismatch: {other:?}"),
        }
    }

    async fn update(&self, id: CartLineId, patch: CartLinePatch) -> Result<(), ServiceError> {
        match self.take(MockCall::Update(id, patch)) {
            Expectation::Update { response, .. } => response,
            other => panic!("Expectation mismatch: {other:?}"),
        }
    }

    async fn delete(&self, id: CartLineId) -> Result<(), ServiceError> {
        match self.take(MockCall::Delete(id)) {
            Expectation::Delete { response, .. } => response,
            other => panic!("Expectation mismatch: {other:?}"),
        }
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        match self.take(MockCall::Clear) {
            Expectation::Clear(response) => response,
            other => panic!("Expectation mismatch: {other:?}"),
        }
    }
}

/// Builder for `list` expectations.
pub struct ListExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl ListExpectationBuilder {
    /// Sets the expectation to return these lines.
    pub fn return_ok(self, items: Vec<CartLine>) {
        self.return_listing(CartListing {
            items,
            amount_total: None,
        });
    }

    pub fn return_listing(self, listing: CartListing) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::List(Ok(Some(listing))));
    }

    /// Sets the expectation to succeed without a listing (`data` absent or null).
    pub fn return_empty(self) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::List(Ok(None)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ServiceError) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::List(Err(error)));
    }
}

enum MutationKind {
    Create,
    Update(CartLineId),
    Delete(CartLineId),
    Clear,
}

/// Builder for create / update / delete / clear expectations.
pub struct MutationExpectationBuilder {
    kind: MutationKind,
    state: Arc<Mutex<MockState>>,
}

impl MutationExpectationBuilder {
    /// Sets the expectation to succeed.
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), ServiceError>) {
        let expectation = match self.kind {
            MutationKind::Create => Expectation::Create(response),
            MutationKind::Update(id) => Expectation::Update { id, response },
            MutationKind::Delete(id) => Expectation::Delete { id, response },
            MutationKind::Clear => Expectation::Clear(response),
        };
        self.state.lock().expectations.push_back(expectation);
    }
}

// =============================================================================
// HAND-DRIVEN CHANNEL HELPERS
// =============================================================================

/// Creates a channel-backed service and the receiver the test answers from.
///
/// Nothing answers requests until the test does, which makes it possible to inspect
/// the store while a call is in flight and to complete calls in any order.
pub fn create_mock_service(buffer_size: usize) -> (ChannelCartService, mpsc::Receiver<CartRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelCartService::new(sender), receiver)
}

/// Helper to verify that the next message is a List request
pub async fn expect_list(receiver: &mut mpsc::Receiver<CartRequest>) -> Option<Reply<CartListing>> {
    match receiver.recv().await {
        Some(CartRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(NewCartLine, Reply<()>)> {
    match receiver.recv().await {
        Some(CartRequest::Create { line, respond_to }) => Some((line, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(CartLineId, CartLinePatch, Reply<()>)> {
    match receiver.recv().await {
        Some(CartRequest::Update {
            id,
            patch,
            respond_to,
        }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(CartLineId, Reply<()>)> {
    match receiver.recv().await {
        Some(CartRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}
