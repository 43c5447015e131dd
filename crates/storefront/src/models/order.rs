//! Order ledger domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmgate_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::shipping::ShippingProfile;

/// A placed order, with its shipping snapshot flattened in (the persisted
/// layout: id, user, timestamp, total, status, payment method, address).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_date: DateTime<Utc>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_method: String,
    #[serde(flatten)]
    pub shipping: ShippingProfile,
}

/// One line of an order: a snapshot of the product name and price at purchase
/// time, deliberately decoupled from the live catalog row.
///
/// `image_url` is joined from the live product purely for display and may
/// differ from what the customer saw at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: i64,
    pub image_url: Option<String>,
}

/// An order together with its lines, as served to customers.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// An order joined with customer identity, as served to the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_username: String,
    pub customer_email: String,
    pub items: Vec<OrderLine>,
}
