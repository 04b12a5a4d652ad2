//! User-facing notifications ("toasts").

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

pub const ADDED: &str = "Added to cart";
pub const REMOVED: &str = "Removed";
pub const CLEARED: &str = "Cart cleared";
pub const CART_UPDATED: &str = "Cart updated";
pub const UPDATE_FAILED: &str = "Update failed";
pub const DELETE_FAILED: &str = "Delete failed";
pub const OPERATION_FAILED: &str = "Operation failed";
pub const SELECTION_PARTIAL: &str = "Selection only partially applied";

/// Fire-and-forget "show message" collaborator.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

/// Emits every notification as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "cart_sync::notify", text = message, "Notification");
    }
}

/// Keeps every notification in issue order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages.lock().iter().filter(|m| *m == message).count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
