use serde::{Deserialize, Deserializer, Serialize};

use std::fmt::Display;

/// Type-safe identifier for cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineId(pub u64);

impl From<u64> for CartLineId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for CartLineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line_{}", self.0)
    }
}

/// Type-safe identifier for product variants (SKUs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(pub u64);

impl From<u64> for SkuId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for SkuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sku_{}", self.0)
    }
}

/// One line of the shopping cart as the remote cart service reports it.
///
/// The server owns identity and pricing: `id` is assigned on create and
/// `total_price` is computed server-side. The client never recomputes it.
///
/// `selected` is persisted server-side. Lines that arrive without the flag
/// (missing or `null`) are treated as unselected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub sku_id: SkuId,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub unit_price: f64,
    pub quantity: u32,
    pub total_price: f64,
    #[serde(default, deserialize_with = "null_as_false")]
    pub selected: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl CartLine {
    /// Creates an unselected line with a total of `unit_price * quantity`.
    ///
    /// # Arguments
    /// * `id` - Server-assigned identifier
    /// * `sku_id` - Product variant the line refers to
    /// * `title` - Display title
    /// * `unit_price` - Price of a single unit
    /// * `quantity` - Number of units
    pub fn new(
        id: impl Into<CartLineId>,
        sku_id: impl Into<SkuId>,
        title: impl Into<String>,
        unit_price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            sku_id: sku_id.into(),
            title: title.into(),
            image: String::new(),
            color: None,
            size: None,
            unit_price,
            quantity,
            total_price: unit_price * f64::from(quantity),
            selected: false,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Payload for adding a SKU to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub sku_id: SkuId,
    pub quantity: u32,
}

/// Partial update of a cart line. Only the fields that are set go on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartLinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<SkuId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl CartLinePatch {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn sku(sku_id: impl Into<SkuId>) -> Self {
        Self {
            sku_id: Some(sku_id.into()),
            ..Self::default()
        }
    }

    pub fn selected(selected: bool) -> Self {
        Self {
            selected: Some(selected),
            ..Self::default()
        }
    }

    /// True when no field is set; such a patch is never sent.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.sku_id.is_none() && self.selected.is_none()
    }
}
