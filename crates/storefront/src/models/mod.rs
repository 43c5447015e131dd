//! Domain types for the storefront.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories convert at the store boundary.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod shipping;
pub mod user;

pub use cart::CartLineView;
pub use order::{AdminOrder, Order, OrderLine, OrderWithItems};
pub use product::Product;
pub use session::{CurrentUser, session_keys};
pub use shipping::{ShippingProfile, ShippingValidationError};
pub use user::User;
