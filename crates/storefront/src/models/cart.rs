//! Cart domain types.

use serde::Serialize;

use farmgate_core::{Price, ProductId};

/// A cart line joined with catalog display fields.
///
/// `unit_price` is the live catalog price at read time, not the price when
/// the item was added; order totals are computed from this.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl CartLineView {
    /// Line total at the current catalog price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.line_total(self.quantity)
    }
}
