use serde::{Deserialize, Serialize};

use super::cart_line::{CartLine, CartLineId};

/// Payload of the cart list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartListing {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<f64>,
}

/// The complete client-side copy of the cart at a point in time.
///
/// Every aggregate below is computed from `lines` on each call; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn get_mut(&mut self, id: CartLineId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    /// Replaces every line with the server's view.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    /// Removes the line with `id`, returning it if it was present.
    pub fn remove(&mut self, id: CartLineId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for line in &mut self.lines {
            line.selected = selected;
        }
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn selected_count(&self) -> usize {
        self.lines.iter().filter(|line| line.selected).count()
    }

    /// Sum of the server-computed totals of the selected lines.
    pub fn selected_total(&self) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.selected)
            .map(|line| line.total_price)
            .sum()
    }

    pub fn all_selected(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|line| line.selected)
    }

    pub fn has_selection(&self) -> bool {
        self.lines.iter().any(|line| line.selected)
    }

    pub fn selected_ids(&self) -> Vec<CartLineId> {
        self.lines
            .iter()
            .filter(|line| line.selected)
            .map(|line| line.id)
            .collect()
    }

    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.lines.iter().filter(|line| line.selected).cloned().collect()
    }

    pub fn ids(&self) -> Vec<CartLineId> {
        self.lines.iter().map(|line| line.id).collect()
    }
}

impl From<Vec<CartLine>> for CartSnapshot {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::new(lines)
    }
}
