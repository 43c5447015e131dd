//! Order ledger repository.
//!
//! The authoritative record of placed orders. Order and line inserts only
//! happen inside the checkout workflow's transaction; everything else here is
//! read-side or the admin status update.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use farmgate_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{AdminOrder, Order, OrderLine, OrderWithItems};
use crate::models::shipping::ShippingProfile;

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    order_date: DateTime<Utc>,
    total_cents: i64,
    status: OrderStatus,
    payment_method: String,
    full_name: String,
    address_line1: String,
    address_line2: String,
    address_line3: Option<String>,
    city: String,
    state: String,
    zip_code: String,
    phone: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            order_date: row.order_date,
            total_amount: Price::from_cents(row.total_cents),
            status: row.status,
            payment_method: row.payment_method,
            shipping: ShippingProfile {
                full_name: row.full_name,
                address_line1: row.address_line1,
                address_line2: row.address_line2,
                address_line3: row.address_line3,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
                phone: row.phone,
            },
        }
    }
}

#[derive(FromRow)]
struct OrderLineRow {
    product_id: i64,
    product_name: String,
    unit_price_cents: i64,
    quantity: i64,
    image_url: Option<String>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: Price::from_cents(row.unit_price_cents),
            quantity: row.quantity,
            image_url: row.image_url,
        }
    }
}

const SELECT_ORDER: &str =
    "SELECT id, user_id, order_date, total_cents, status, payment_method, \
            full_name, address_line1, address_line2, address_line3, \
            city, state, zip_code, phone \
     FROM orders";

/// Repository for order ledger operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order row inside an open transaction, returning its id.
    ///
    /// The shipping profile is copied verbatim into the row as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(
        conn: &mut SqliteConnection,
        user_id: UserId,
        total: Price,
        payment_method: &str,
        shipping: &ShippingProfile,
    ) -> Result<OrderId, RepositoryError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders \
                 (user_id, total_cents, status, payment_method, \
                  full_name, address_line1, address_line2, address_line3, \
                  city, state, zip_code, phone) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING id",
        )
        .bind(user_id.as_i64())
        .bind(total.as_cents())
        .bind(OrderStatus::Pending)
        .bind(payment_method)
        .bind(&shipping.full_name)
        .bind(&shipping.address_line1)
        .bind(&shipping.address_line2)
        .bind(&shipping.address_line3)
        .bind(&shipping.city)
        .bind(&shipping.state)
        .bind(&shipping.zip_code)
        .bind(&shipping.phone)
        .fetch_one(conn)
        .await?;

        Ok(OrderId::new(id))
    }

    /// Insert one order line snapshot inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_line(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        product_id: ProductId,
        product_name: &str,
        unit_price: Price,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO order_items \
                 (order_id, product_id, product_name, unit_price_cents, quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(order_id.as_i64())
        .bind(product_id.as_i64())
        .bind(product_name)
        .bind(unit_price.as_cents())
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Get an order by id regardless of owner (admin and workflow use).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    /// Get an order with its lines, only if owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = Order::from(row);
        let items = self.lines_for_order(order.id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// List the user's orders, newest first, each with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = ?1 ORDER BY order_date DESC, id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = Order::from(row);
            let items = self.lines_for_order(order.id).await?;
            orders.push(OrderWithItems { order, items });
        }

        Ok(orders)
    }

    /// List every order with customer identity, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        #[derive(FromRow)]
        struct AdminOrderRow {
            #[sqlx(flatten)]
            order: OrderRow,
            customer_username: String,
            customer_email: String,
        }

        let rows = sqlx::query_as::<_, AdminOrderRow>(
            "SELECT o.id, o.user_id, o.order_date, o.total_cents, o.status, o.payment_method, \
                    o.full_name, o.address_line1, o.address_line2, o.address_line3, \
                    o.city, o.state, o.zip_code, o.phone, \
                    u.username AS customer_username, u.email AS customer_email \
             FROM orders o \
             JOIN users u ON o.user_id = u.id \
             ORDER BY o.order_date DESC, o.id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = Order::from(row.order);
            let items = self.lines_for_order(order.id).await?;
            orders.push(AdminOrder {
                order,
                customer_username: row.customer_username,
                customer_email: row.customer_email,
                items,
            });
        }

        Ok(orders)
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(id.as_i64())
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Lines for one order, with the live product image joined for display.
    async fn lines_for_order(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT oi.product_id, oi.product_name, oi.unit_price_cents, oi.quantity, \
                    p.image_url \
             FROM order_items oi \
             LEFT JOIN products p ON oi.product_id = p.id \
             WHERE oi.order_id = ?1",
        )
        .bind(order_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }
}
