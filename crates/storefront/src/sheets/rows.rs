//! Row projections of catalog and ledger data kept in the mirror.
//!
//! Sheet cells are untyped strings maintained partly by hand, so parsing is
//! deliberately lenient: an unreadable id, price, or stock becomes a zero
//! value with a warning instead of failing the whole read.

use serde::{Deserialize, Serialize};
use tracing::warn;

use farmgate_core::{Price, SheetRowId};

/// Header row of the products tab, in column order.
pub const PRODUCT_HEADERS: [&str; 6] =
    ["id", "name", "description", "price", "image_url", "stock"];

/// Header row of the orders tab, in column order.
pub const ORDER_HEADERS: [&str; 17] = [
    "id",
    "user_id",
    "username",
    "email",
    "order_date",
    "total_amount",
    "status",
    "payment_method",
    "full_name",
    "address_line1",
    "address_line2",
    "address_line3",
    "city",
    "state",
    "zip_code",
    "phone",
    "items_json",
];

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

fn lenient_i64(row: &[String], index: usize, field: &str) -> i64 {
    let raw = cell(row, index);
    raw.parse().unwrap_or_else(|_| {
        if !raw.is_empty() {
            warn!(field, value = raw, "unreadable sheet cell, defaulting to 0");
        }
        0
    })
}

fn lenient_price(row: &[String], index: usize, field: &str) -> Price {
    let raw = cell(row, index);
    Price::parse(raw).unwrap_or_else(|_| {
        if !raw.is_empty() {
            warn!(field, value = raw, "unreadable sheet cell, defaulting to 0.00");
        }
        Price::ZERO
    })
}

/// A product row in the mirror's products tab.
///
/// Mirror ids are allocated by max-scan of the id column and are unrelated to
/// local catalog ids.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MirroredProductRow {
    pub id: SheetRowId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub stock: i64,
}

impl MirroredProductRow {
    /// Serialize into sheet column order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            self.price.to_string(),
            self.image_url.clone(),
            self.stock.to_string(),
        ]
    }

    /// Parse a data row (header excluded), leniently.
    #[must_use]
    pub fn parse_row(row: &[String]) -> Self {
        Self {
            id: SheetRowId::new(lenient_i64(row, 0, "product id")),
            name: cell(row, 1).trim().to_owned(),
            description: cell(row, 2).trim().to_owned(),
            price: lenient_price(row, 3, "product price"),
            image_url: cell(row, 4).trim().to_owned(),
            stock: lenient_i64(row, 5, "product stock"),
        }
    }
}

/// One line item inside a mirrored order's `items_json` column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirroredOrderItem {
    pub product_id: i64,
    pub name: String,
    pub price: Price,
    pub quantity: i64,
}

/// An order row in the mirror's orders tab.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MirroredOrderRow {
    pub id: SheetRowId,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// RFC 3339 timestamp of the append, not the ledger's order date.
    pub order_date: String,
    pub total_amount: Price,
    pub status: String,
    pub payment_method: String,
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub items: Vec<MirroredOrderItem>,
}

impl MirroredOrderRow {
    /// Serialize into sheet column order, with the items as a JSON cell.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        let items_json = serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_owned());
        vec![
            self.id.to_string(),
            self.user_id.to_string(),
            self.username.clone(),
            self.email.clone(),
            self.order_date.clone(),
            self.total_amount.to_string(),
            self.status.clone(),
            self.payment_method.clone(),
            self.full_name.clone(),
            self.address_line1.clone(),
            self.address_line2.clone(),
            self.address_line3.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zip_code.clone(),
            self.phone.clone(),
            items_json,
        ]
    }

    /// Parse a data row (header excluded), leniently.
    ///
    /// An unreadable `items_json` cell yields an empty item list.
    #[must_use]
    pub fn parse_row(row: &[String]) -> Self {
        let items_raw = cell(row, 16);
        let items = serde_json::from_str(items_raw).unwrap_or_else(|_| {
            if !items_raw.is_empty() {
                warn!(value = items_raw, "unreadable items_json cell, defaulting to []");
            }
            Vec::new()
        });

        Self {
            id: SheetRowId::new(lenient_i64(row, 0, "order id")),
            user_id: lenient_i64(row, 1, "order user_id"),
            username: cell(row, 2).to_owned(),
            email: cell(row, 3).to_owned(),
            order_date: cell(row, 4).to_owned(),
            total_amount: lenient_price(row, 5, "order total"),
            status: cell(row, 6).to_owned(),
            payment_method: cell(row, 7).to_owned(),
            full_name: cell(row, 8).to_owned(),
            address_line1: cell(row, 9).to_owned(),
            address_line2: cell(row, 10).to_owned(),
            address_line3: cell(row, 11).to_owned(),
            city: cell(row, 12).to_owned(),
            state: cell(row, 13).to_owned(),
            zip_code: cell(row, 14).to_owned(),
            phone: cell(row, 15).to_owned(),
            items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_product_row_roundtrip() {
        let row = MirroredProductRow {
            id: SheetRowId::new(3),
            name: "Organic Tomatoes".to_owned(),
            description: "Fresh, ripe organic tomatoes.".to_owned(),
            price: Price::parse("2.50").unwrap(),
            image_url: "/images/tomatoes.jpg".to_owned(),
            stock: 100,
        };

        let parsed = MirroredProductRow::parse_row(&row.to_row());
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_product_row_lenient_defaults() {
        let parsed = MirroredProductRow::parse_row(&strings(&[
            "oops",
            " Eggs ",
            "",
            "not-a-price",
            "",
            "-",
        ]));
        assert_eq!(parsed.id, SheetRowId::new(0));
        assert_eq!(parsed.name, "Eggs");
        assert_eq!(parsed.price, Price::ZERO);
        assert_eq!(parsed.stock, 0);
    }

    #[test]
    fn test_product_row_short_row() {
        // Sheets drop trailing empty cells from fetched rows.
        let parsed = MirroredProductRow::parse_row(&strings(&["5", "Milk"]));
        assert_eq!(parsed.id, SheetRowId::new(5));
        assert_eq!(parsed.name, "Milk");
        assert_eq!(parsed.stock, 0);
    }

    #[test]
    fn test_order_row_roundtrip() {
        let row = MirroredOrderRow {
            id: SheetRowId::new(9),
            user_id: 2,
            username: "asha".to_owned(),
            email: "asha@example.com".to_owned(),
            order_date: "2026-02-11T08:30:00Z".to_owned(),
            total_amount: Price::parse("8.00").unwrap(),
            status: "pending".to_owned(),
            payment_method: "cod".to_owned(),
            full_name: "Asha Patel".to_owned(),
            address_line1: "14 Orchard Row".to_owned(),
            address_line2: "Flat 2".to_owned(),
            address_line3: String::new(),
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            zip_code: "411001".to_owned(),
            phone: "+91 98000 00000".to_owned(),
            items: vec![MirroredOrderItem {
                product_id: 1,
                name: "Organic Tomatoes".to_owned(),
                price: Price::parse("2.50").unwrap(),
                quantity: 2,
            }],
        };

        let parsed = MirroredOrderRow::parse_row(&row.to_row());
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_order_row_bad_items_json() {
        let mut cells = vec![String::from("1"); ORDER_HEADERS.len()];
        if let Some(last) = cells.last_mut() {
            *last = "{not json".to_owned();
        }
        let parsed = MirroredOrderRow::parse_row(&cells);
        assert!(parsed.items.is_empty());
    }
}
