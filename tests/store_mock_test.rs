use cart_sync::model::{CartLine, CartLineId, CartLinePatch, CartListing};
use cart_sync::service::mock::{create_mock_service, expect_list, expect_update, MockCall, MockCartService};
use cart_sync::service::{ChannelCartService, Envelope, ServiceError, CONNECTION_FAILED};
use cart_sync::store::{notify, CartError, CartStore, RecordingNotifier};
use std::sync::Arc;

type MockStore = CartStore<MockCartService, RecordingNotifier>;

fn setup() -> (MockStore, MockCartService, RecordingNotifier) {
    let mock = MockCartService::new();
    let notifier = RecordingNotifier::new();
    let store = CartStore::new(mock.clone(), notifier.clone());
    (store, mock, notifier)
}

/// `[{id:1, qty:2, price:10, total:20}, {id:2, qty:1, price:5, total:5}]`, nothing selected.
fn two_lines() -> Vec<CartLine> {
    vec![
        CartLine::new(1, 7, "Tee", 10.0, 2),
        CartLine::new(2, 8, "Cap", 5.0, 1),
    ]
}

async fn loaded(lines: Vec<CartLine>) -> (MockStore, MockCartService, RecordingNotifier) {
    let (store, mock, notifier) = setup();
    mock.expect_list().return_ok(lines);
    store.fetch().await.expect("Initial fetch failed");
    (store, mock, notifier)
}

#[tokio::test]
async fn test_empty_patch_is_a_no_op() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    let before = store.snapshot();

    store
        .update(CartLineId(1), CartLinePatch::default())
        .await
        .expect("Empty patch must succeed");

    assert_eq!(mock.call_count(), 1); // the initial fetch only
    assert_eq!(store.snapshot(), before);
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_toggle_rolls_back_on_failure() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(1))
        .return_err(ServiceError::api(500, "Internal error"));

    let result = store.toggle_select(CartLineId(1)).await;

    assert!(matches!(result, Err(CartError::Service(_))));
    assert!(!store.line(CartLineId(1)).unwrap().selected);
    assert!(!store.is_pending(CartLineId(1)));
    assert_eq!(notifier.messages(), vec!["Internal error"]);
    mock.verify();
}

#[tokio::test]
async fn test_toggle_converges_on_success() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(1)).return_ok();

    let selected = store.toggle_select(CartLineId(1)).await.expect("Toggle failed");

    assert!(selected);
    assert!(store.line(CartLineId(1)).unwrap().selected);
    assert!(notifier.is_empty());
    // No refetch after a successful toggle
    assert_eq!(
        mock.calls().last(),
        Some(&MockCall::Update(CartLineId(1), CartLinePatch::selected(true)))
    );
    mock.verify();
}

#[tokio::test]
async fn test_transport_failure_uses_generic_message() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(2))
        .return_err(ServiceError::Transport("connection refused".into()));

    let _ = store.toggle_select(CartLineId(2)).await;

    assert_eq!(notifier.messages(), vec![CONNECTION_FAILED]);
}

#[tokio::test]
async fn test_select_all_success() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(1)).return_ok();
    mock.expect_update(CartLineId(2)).return_ok();

    store.select_all(true).await.expect("Select all failed");

    assert!(store.all_selected());
    assert_eq!(store.selected_total(), 25.0);
    assert_eq!(store.selected_count(), 2);
    assert!(notifier.is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_select_all_partial_failure_refetches() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(1)).return_ok();
    mock.expect_update(CartLineId(2))
        .return_err(ServiceError::api(500, "Internal error"));
    mock.expect_list().return_ok(vec![
        CartLine::new(1, 7, "Tee", 10.0, 2).with_selected(true),
        CartLine::new(2, 8, "Cap", 5.0, 1),
    ]);

    let err = store.select_all(true).await.unwrap_err();

    assert_eq!(err, CartError::PartialSelection { failed: 1, total: 2 });
    assert!(store.line(CartLineId(1)).unwrap().selected);
    assert!(!store.line(CartLineId(2)).unwrap().selected);
    assert_eq!(store.selected_total(), 20.0);
    assert_eq!(notifier.messages(), vec![notify::SELECTION_PARTIAL]);
    mock.verify();
}

#[tokio::test]
async fn test_select_all_rolls_back_locally_when_refetch_fails() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_update(CartLineId(1)).return_ok();
    mock.expect_update(CartLineId(2))
        .return_err(ServiceError::Transport("timeout".into()));
    mock.expect_list()
        .return_err(ServiceError::Transport("timeout".into()));

    let err = store.select_all(true).await.unwrap_err();

    assert_eq!(err, CartError::PartialSelection { failed: 1, total: 2 });
    assert!(store.line(CartLineId(1)).unwrap().selected);
    assert!(!store.line(CartLineId(2)).unwrap().selected);
    assert_eq!(notifier.count(notify::SELECTION_PARTIAL), 1);
    mock.verify();
}

#[tokio::test]
async fn test_cleanup_continues_past_failed_delete() {
    let selected = vec![
        CartLine::new(1, 7, "Tee", 10.0, 1).with_selected(true),
        CartLine::new(2, 8, "Cap", 5.0, 1).with_selected(true),
        CartLine::new(3, 9, "Socks", 2.0, 1).with_selected(true),
    ];
    let (store, mock, notifier) = loaded(selected).await;
    mock.expect_delete(CartLineId(1)).return_ok();
    mock.expect_delete(CartLineId(2))
        .return_err(ServiceError::api(404, "Cart item not found"));
    mock.expect_delete(CartLineId(3)).return_ok();
    mock.expect_list()
        .return_ok(vec![CartLine::new(2, 8, "Cap", 5.0, 1).with_selected(true)]);

    let report = store
        .remove_selected_items()
        .await
        .expect("Cleanup must not fail on a single delete");

    assert_eq!(report.attempted, 3);
    assert_eq!(report.removed, 2);
    assert_eq!(report.failed, vec![CartLineId(2)]);
    assert_eq!(store.lines().len(), 1);
    assert_eq!(notifier.messages(), vec![notify::CART_UPDATED]);
    assert_eq!(
        mock.calls()[1..4],
        [
            MockCall::Delete(CartLineId(1)),
            MockCall::Delete(CartLineId(2)),
            MockCall::Delete(CartLineId(3)),
        ]
    );
    mock.verify();
}

#[tokio::test]
async fn test_fetch_failure_keeps_snapshot() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_list()
        .return_err(ServiceError::Transport("timeout".into()));

    let result = store.fetch().await;

    assert!(result.is_err());
    assert_eq!(store.lines(), two_lines());
    assert!(!store.is_loading());
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_listing_without_data_keeps_snapshot() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_list().return_empty();

    store.fetch().await.expect("A successful empty response is not an error");

    assert_eq!(store.lines(), two_lines());
    assert!(!store.is_loading());
    assert!(notifier.is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_validation_failure_notified_when_not_quiet() {
    let (store, mock, notifier) = setup();
    let store = store.with_quiet_validation(false);
    mock.expect_update(CartLineId(1))
        .return_err(ServiceError::Validation("quantity: ensure this value is less than 100".into()));

    let _ = store.update(CartLineId(1), CartLinePatch::quantity(500)).await;

    assert_eq!(
        notifier.messages(),
        vec!["quantity: ensure this value is less than 100"]
    );
}

#[tokio::test]
async fn test_failed_remove_keeps_line() {
    let (store, mock, notifier) = loaded(two_lines()).await;
    mock.expect_delete(CartLineId(2))
        .return_err(ServiceError::Api { code: 500, message: None });

    assert!(store.remove(CartLineId(2)).await.is_err());

    assert_eq!(store.lines().len(), 2);
    assert_eq!(notifier.messages(), vec![notify::DELETE_FAILED]);
}

// =============================================================================
// HAND-DRIVEN TESTS
// =============================================================================

fn listing(lines: Vec<CartLine>) -> Envelope<CartListing> {
    Envelope::ok(CartListing {
        items: lines,
        amount_total: None,
    })
}

async fn hand_driven_store() -> (
    Arc<CartStore<ChannelCartService, RecordingNotifier>>,
    tokio::sync::mpsc::Receiver<cart_sync::service::message::CartRequest>,
    RecordingNotifier,
) {
    let (service, mut receiver) = create_mock_service(8);
    let notifier = RecordingNotifier::new();
    let store = Arc::new(CartStore::new(service, notifier.clone()));

    let s = store.clone();
    let fetch = tokio::spawn(async move { s.fetch().await });
    let reply = expect_list(&mut receiver).await.expect("Expected List request");
    reply
        .send(listing(vec![CartLine::new(1, 7, "Tee", 10.0, 1)]))
        .unwrap();
    fetch.await.unwrap().expect("Initial fetch failed");

    (store, receiver, notifier)
}

#[tokio::test]
async fn test_out_of_order_toggle_older_failure_is_ignored() {
    let (store, mut receiver, notifier) = hand_driven_store().await;
    let line = CartLineId(1);

    let s = store.clone();
    let first = tokio::spawn(async move { s.toggle_select(line).await });
    let (_, patch, first_reply) = expect_update(&mut receiver).await.expect("Expected Update request");
    assert_eq!(patch.selected, Some(true));
    assert!(store.line(line).unwrap().selected);

    let s = store.clone();
    let second = tokio::spawn(async move { s.toggle_select(line).await });
    let (_, patch, second_reply) = expect_update(&mut receiver).await.expect("Expected Update request");
    assert_eq!(patch.selected, Some(false));
    assert!(!store.line(line).unwrap().selected);

    // The second toggle lands first, then the first one fails
    second_reply.send(Envelope::ok(())).unwrap();
    assert_eq!(second.await.unwrap(), Ok(false));
    first_reply.send(Envelope::failure(500, "boom")).unwrap();
    assert!(first.await.unwrap().is_err());

    assert!(!store.line(line).unwrap().selected);
    assert!(!store.is_pending(line));
    assert_eq!(notifier.messages(), vec!["boom"]);
}

#[tokio::test]
async fn test_out_of_order_toggle_last_response_wins() {
    let (store, mut receiver, _) = hand_driven_store().await;
    let line = CartLineId(1);

    let s = store.clone();
    let first = tokio::spawn(async move { s.toggle_select(line).await });
    let (_, _, first_reply) = expect_update(&mut receiver).await.expect("Expected Update request");

    let s = store.clone();
    let second = tokio::spawn(async move { s.toggle_select(line).await });
    let (_, _, second_reply) = expect_update(&mut receiver).await.expect("Expected Update request");

    // The newer flip fails and rolls back, then the older success arrives last
    second_reply.send(Envelope::failure(500, "boom")).unwrap();
    assert!(second.await.unwrap().is_err());
    assert!(!store.line(line).unwrap().selected);

    first_reply.send(Envelope::ok(())).unwrap();
    assert_eq!(first.await.unwrap(), Ok(true));
    assert!(store.line(line).unwrap().selected);
    assert!(!store.is_pending(line));
}

#[tokio::test]
async fn test_loading_flag_tracks_fetch() {
    let (store, mut receiver, _) = hand_driven_store().await;
    assert!(!store.is_loading());

    let s = store.clone();
    let fetch = tokio::spawn(async move { s.fetch().await });
    let reply = expect_list(&mut receiver).await.expect("Expected List request");
    assert!(store.is_loading());

    // Dropping the reply fails the fetch
    drop(reply);
    let result = fetch.await.unwrap();

    assert!(matches!(result, Err(CartError::Service(ServiceError::Transport(_)))));
    assert!(!store.is_loading());
    assert_eq!(store.lines().len(), 1);
}

#[tokio::test]
async fn test_fetch_during_toggle_overrides_the_flip() {
    let (store, mut receiver, notifier) = hand_driven_store().await;
    let line = CartLineId(1);

    let s = store.clone();
    let toggle = tokio::spawn(async move { s.toggle_select(line).await });
    let (_, _, toggle_reply) = expect_update(&mut receiver).await.expect("Expected Update request");
    assert!(store.line(line).unwrap().selected);

    // A fetch answered before the toggle lands carries the old flag
    let s = store.clone();
    let fetch = tokio::spawn(async move { s.fetch().await });
    let reply = expect_list(&mut receiver).await.expect("Expected List request");
    reply
        .send(listing(vec![CartLine::new(1, 7, "Tee", 10.0, 1)]))
        .unwrap();
    fetch.await.unwrap().expect("Fetch failed");
    assert!(!store.line(line).unwrap().selected);

    toggle_reply.send(Envelope::ok(())).unwrap();
    assert_eq!(toggle.await.unwrap(), Ok(true));

    // The confirmation does not resurrect the flip; the next fetch will
    assert!(!store.line(line).unwrap().selected);
    assert!(!store.is_pending(line));
    assert!(notifier.is_empty());
}
