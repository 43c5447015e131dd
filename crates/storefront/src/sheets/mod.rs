//! Google Sheets mirror adapter.
//!
//! The back office keeps a row-oriented copy of products and orders in two
//! spreadsheet tabs, reachable only through the values API primitives in
//! [`client`]. The mirror is best-effort: the local SQLite store is
//! authoritative, writes here are never retried, and read failures degrade to
//! empty results at the call site.

pub mod client;
pub mod rows;

use thiserror::Error;

pub use client::{SheetRef, SheetsClient};
pub use rows::{MirroredOrderItem, MirroredOrderRow, MirroredProductRow};

/// Errors from the spreadsheet mirror.
///
/// These never reach customers: checkout swallows them after logging, and
/// admin read paths degrade to empty lists.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Transport-level failure (DNS, TLS, timeout).
    #[error("sheets request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("sheets response invalid: {0}")]
    Response(String),

    /// A header the adapter relies on is missing from the sheet.
    #[error("sheets column not found: {0}")]
    MissingColumn(&'static str),

    /// No row carries the requested id.
    #[error("row with id {0} not found")]
    RowNotFound(i64),

    /// The mirror is not configured for this deployment.
    #[error("spreadsheet mirror is not configured")]
    Unconfigured,
}
