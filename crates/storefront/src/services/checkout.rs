//! Order placement workflow.
//!
//! The one place where the cart, catalog, shipping profile, order ledger and
//! spreadsheet mirror all meet. The local transaction covers the order, its
//! lines and the stock decrements; the mirror write and the cart clear sit
//! outside it on purpose (the ledger is authoritative, the mirror is
//! best-effort and may silently lag).

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use farmgate_core::{OrderId, Price, ProductId, UserId};

use crate::db::users::UserRepository;
use crate::db::{CartRepository, OrderRepository, ProductRepository, RepositoryError, ShippingRepository};
use crate::models::cart::CartLineView;
use crate::models::shipping::ShippingProfile;
use crate::sheets::{MirroredOrderItem, MirroredOrderRow, SheetsClient, SheetsError};

/// Errors surfaced by [`CheckoutService::place_order`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; nothing was mutated.
    #[error("your cart is empty")]
    EmptyCart,

    /// No shipping profile on file; nothing was mutated.
    #[error("please provide your shipping information before placing an order")]
    MissingShippingInfo,

    /// A product had less stock than the cart requested; the whole
    /// transaction was rolled back.
    #[error("not enough stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// The local transaction failed; nothing was persisted.
    #[error("failed to place order: {0}")]
    Persistence(#[from] RepositoryError),
}

/// The order placement workflow.
///
/// Holds the request-scoped store handle and the optional mirror; no ambient
/// state. `mirror = None` (mirror unconfigured or unreachable at startup)
/// skips the best-effort append entirely.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    mirror: Option<&'a SheetsClient>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, mirror: Option<&'a SheetsClient>) -> Self {
        Self { pool, mirror }
    }

    /// Place an order for everything currently in the user's cart.
    ///
    /// Preconditions are checked in order and short-circuit before any
    /// mutation: a non-empty cart, then a saved shipping profile. The total
    /// is computed from live catalog prices at this instant, not from prices
    /// when items were added.
    ///
    /// Within one local transaction: the order row (status `pending`, with a
    /// verbatim shipping snapshot), one line snapshot per cart line, and a
    /// conditional stock decrement per product. Any failure rolls all of it
    /// back.
    ///
    /// After commit the order is appended to the spreadsheet mirror
    /// best-effort (failure logged and swallowed, never retried), then the
    /// cart is cleared. Deliberately not idempotent: no request
    /// deduplication.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`]; see its variants for which steps mutate.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        payment_method: &str,
    ) -> Result<OrderId, CheckoutError> {
        let cart = CartRepository::new(self.pool);
        let shipping_repo = ShippingRepository::new(self.pool);

        // Preconditions, in order.
        let lines = cart.list_for_user(user_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = shipping_repo
            .get(user_id)
            .await?
            .ok_or(CheckoutError::MissingShippingInfo)?;

        // Live prices at this instant.
        let total: Price = lines.iter().map(CartLineView::line_total).sum();

        // All-or-nothing local transaction: order, lines, stock.
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order_id =
            OrderRepository::insert_order(&mut *tx, user_id, total, payment_method, &shipping)
                .await?;

        for line in &lines {
            OrderRepository::insert_line(
                &mut *tx,
                order_id,
                line.product_id,
                &line.name,
                line.unit_price,
                line.quantity,
            )
            .await?;

            let decremented =
                ProductRepository::decrement_stock(&mut *tx, line.product_id, line.quantity)
                    .await?;
            if !decremented {
                tx.rollback().await.map_err(RepositoryError::from)?;
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                });
            }
        }

        tx.commit().await.map_err(RepositoryError::from)?;
        info!(%order_id, %total, "order committed");

        // Best-effort mirror append. The order is already committed; a mirror
        // failure must not surface to the customer and is not retried, so the
        // sheet can permanently lag the ledger until corrected by hand.
        if let Some(mirror) = self.mirror {
            if let Err(e) = self
                .mirror_order(mirror, order_id, user_id, total, payment_method, &shipping, &lines)
                .await
            {
                warn!(%order_id, error = %e, "order not mirrored to spreadsheet");
            }
        }

        // Outside the transaction: an error here leaves the committed order
        // in place.
        cart.clear_for_user(user_id).await?;

        Ok(order_id)
    }

    async fn mirror_order(
        &self,
        mirror: &SheetsClient,
        order_id: OrderId,
        user_id: UserId,
        total: Price,
        payment_method: &str,
        shipping: &ShippingProfile,
        lines: &[CartLineView],
    ) -> Result<(), SheetsError> {
        let customer = UserRepository::new(self.pool)
            .get_by_id(user_id)
            .await
            .ok()
            .flatten();

        let (username, email) = customer.map_or_else(
            || ("N/A".to_owned(), "N/A".to_owned()),
            |u| (u.username, u.email.into_inner()),
        );

        let items = lines
            .iter()
            .map(|line| MirroredOrderItem {
                product_id: line.product_id.as_i64(),
                name: line.name.clone(),
                price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();

        let row = MirroredOrderRow {
            // Allocated by the client on append; the sheet id space is
            // independent of the ledger's.
            id: farmgate_core::SheetRowId::new(0),
            user_id: user_id.as_i64(),
            username,
            email,
            order_date: Utc::now().to_rfc3339(),
            total_amount: total,
            status: "pending".to_owned(),
            payment_method: payment_method.to_owned(),
            full_name: shipping.full_name.clone(),
            address_line1: shipping.address_line1.clone(),
            address_line2: shipping.address_line2.clone(),
            address_line3: shipping.address_line3.clone().unwrap_or_default(),
            city: shipping.city.clone(),
            state: shipping.state.clone(),
            zip_code: shipping.zip_code.clone(),
            phone: shipping.phone.clone(),
            items,
        };

        let sheet_id = mirror.append_order(row).await?;
        info!(%order_id, %sheet_id, "order mirrored to spreadsheet");
        Ok(())
    }
}
