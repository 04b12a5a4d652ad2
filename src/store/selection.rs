//! Bookkeeping for selection flips that are still waiting on the server.
//!
//! Every optimistic flip takes a ticket (a sequence number) for its line. The line's entry
//! remembers the latest ticket issued and the last value the server confirmed:
//!
//! * success: the confirmed value becomes the response's value;
//! * failure of the latest ticket: the caller restores the confirmed value;
//! * failure of an older ticket: a newer flip owns the flag, nothing is restored.
//!
//! The entry is dropped once the latest ticket settles. A success that arrives after that
//! is the last response, so the caller applies its value.

use crate::model::{CartLine, CartLineId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    latest: u64,
    confirmed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct PendingSelections {
    next_ticket: u64,
    lines: HashMap<CartLineId, Pending>,
}

impl PendingSelections {
    /// Registers a flip of `id`. `prior` is the local value before the flip.
    pub(crate) fn begin(&mut self, id: CartLineId, prior: bool) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.lines
            .entry(id)
            .and_modify(|pending| pending.latest = ticket)
            .or_insert(Pending {
                latest: ticket,
                confirmed: prior,
            });
        ticket
    }

    /// Returns the value to apply locally, or `None` when the local flag already holds it
    /// or a newer flip owns it.
    pub(crate) fn succeed(&mut self, id: CartLineId, ticket: u64, value: bool) -> Option<bool> {
        match self.lines.get_mut(&id) {
            Some(pending) => {
                pending.confirmed = value;
                if pending.latest == ticket {
                    self.lines.remove(&id);
                }
                None
            }
            None => Some(value),
        }
    }

    /// Returns the value to restore, or `None` when a newer flip is outstanding.
    pub(crate) fn fail(&mut self, id: CartLineId, ticket: u64) -> Option<bool> {
        match self.lines.get(&id) {
            Some(pending) if pending.latest == ticket => {
                let confirmed = pending.confirmed;
                self.lines.remove(&id);
                Some(confirmed)
            }
            _ => None,
        }
    }

    pub(crate) fn is_pending(&self, id: CartLineId) -> bool {
        self.lines.contains_key(&id)
    }

    /// A fetched listing is the newest server truth: adopt its flags as confirmed and
    /// forget lines the server no longer has.
    pub(crate) fn reconcile(&mut self, lines: &[CartLine]) {
        self.lines.retain(|id, pending| match lines.iter().find(|l| l.id == *id) {
            Some(line) => {
                pending.confirmed = line.selected;
                true
            }
            None => false,
        });
    }

    pub(crate) fn forget(&mut self, id: CartLineId) {
        self.lines.remove(&id);
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}
