//! Admin route handlers.
//!
//! Everything under `/api/admin` requires an admin session. The only
//! exception is the mirror product list, mounted publicly because the
//! product page reads it directly.

pub mod orders;
pub mod products;
pub mod sheets;
