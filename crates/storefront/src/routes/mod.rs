//! HTTP route handlers for the storefront.
//!
//! All endpoints speak JSON with the `{ "success": bool, "message": ... }`
//! envelope; session cookies carry identity.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register           - Create a customer account
//! POST /api/auth/login              - Customer login (admins refused)
//! POST /api/auth/admin-login        - Admin login
//! POST /api/auth/logout             - Logout (requires auth)
//! GET  /api/auth/status             - Is a user logged in?
//! POST /api/auth/forgot-password    - Issue a reset token, email the link
//! POST /api/auth/reset-password     - Consume a token, set a new password
//!
//! # Catalog
//! GET  /api/products                - Local catalog list/search (?query=)
//! GET  /api/products/{id}           - Product detail
//! GET  /api/sheets/products         - Mirror product list (public, degrades to [])
//!
//! # Cart (requires auth)
//! GET  /api/cart                    - Cart lines joined with catalog fields
//! POST /api/cart/add                - Add or merge a line
//! POST /api/cart/quantity           - Increase/decrease a line by one
//! POST /api/cart/remove             - Remove a line
//! GET  /api/cart/count              - Total quantity badge
//!
//! # Shipping & account (requires auth)
//! GET  /api/shipping                - Saved shipping profile
//! POST /api/shipping                - Upsert shipping profile
//! GET  /api/account/profile         - User + shipping profile
//! POST /api/account/profile         - Update username/email
//! POST /api/account/password        - Change password
//!
//! # Orders (requires auth)
//! POST /api/orders                  - Place an order (the checkout workflow)
//! GET  /api/orders                  - Order history with line items
//! GET  /api/orders/{id}             - Order detail (owner only)
//!
//! # Misc
//! POST /api/contact                 - Contact form (logged, no mail)
//!
//! # Admin (requires admin session)
//! GET  /api/admin/orders                      - Full ledger with customer info
//! POST /api/admin/orders/{id}/status          - Update order status
//! POST /api/admin/products/import             - CSV product import (multipart)
//! POST /api/admin/sheets/products             - Append product to the mirror
//! PUT  /api/admin/sheets/products/{id}        - Update mirror product
//! DELETE /api/admin/sheets/products/{id}      - Delete mirror product
//! GET  /api/admin/sheets/orders               - Mirror order list
//! PUT  /api/admin/sheets/orders/{id}/status   - Update mirror order status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod orders;
pub mod products;
pub mod shipping;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin-login", post(auth::admin_login))
        .route("/logout", post(auth::logout))
        .route("/status", get(auth::status))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::items))
        .route("/add", post(cart::add))
        .route("/quantity", post(cart::quantity))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place).get(orders::history))
        .route("/{id}", get(orders::details))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .route("/orders", get(admin::orders::list))
        .route("/orders/{id}/status", post(admin::orders::update_status))
        .route("/products/import", post(admin::products::import))
        .route("/sheets/products", post(admin::sheets::add_product))
        .route(
            "/sheets/products/{id}",
            put(admin::sheets::update_product).delete(admin::sheets::delete_product),
        )
        .route("/sheets/orders", get(admin::sheets::list_orders))
        .route(
            "/sheets/orders/{id}/status",
            put(admin::sheets::update_order_status),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .route(
            "/api/products",
            get(products::list),
        )
        .route("/api/products/{id}", get(products::show))
        // The mirror product list is deliberately public: the product page
        // reads it directly, and it degrades to [] when the mirror is down.
        .route("/api/sheets/products", get(admin::sheets::list_products))
        .nest("/api/cart", cart_routes())
        .route(
            "/api/shipping",
            get(shipping::show).post(shipping::save),
        )
        .route(
            "/api/account/profile",
            get(account::profile).post(account::update_profile),
        )
        .route("/api/account/password", post(account::change_password))
        .nest("/api/orders", order_routes())
        .route("/api/contact", post(contact::submit))
        .nest("/api/admin", admin_routes())
}
