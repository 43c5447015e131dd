//! Google Sheets values-API client.
//!
//! All primitives are unindexed operations over the full tab: reads fetch
//! every row, lookups are linear scans of the id column, and id allocation is
//! a max-scan. Acceptable only because back-office volume is low. Id
//! allocation is not atomic; two concurrent writers can mint the same id
//! (known limitation, inherited from the sheet-as-database model).

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use farmgate_core::SheetRowId;

use super::SheetsError;
use super::rows::{MirroredOrderRow, MirroredProductRow};

/// Request timeout for every mirror call. The mirror sits on the checkout
/// path, so a stalled spreadsheet must not stall the store.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One spreadsheet tab addressed by the client.
#[derive(Debug, Clone)]
pub struct SheetRef {
    /// Spreadsheet document id (from its URL).
    pub spreadsheet_id: String,
    /// Tab title, e.g. `Products`.
    pub title: String,
    /// Numeric grid id of the tab, needed for structural edits (row deletes).
    pub grid_id: i64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for the spreadsheet mirror's two tabs.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    api_base: String,
    access_token: SecretString,
    products: SheetRef,
    orders: SheetRef,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("api_base", &self.api_base)
            .field("access_token", &"[REDACTED]")
            .field("products", &self.products)
            .field("orders", &self.orders)
            .finish()
    }
}

impl SheetsClient {
    /// Create a new mirror client.
    ///
    /// `api_base` is the Sheets endpoint root (overridable for tests),
    /// normally `https://sheets.googleapis.com/v4`.
    #[must_use]
    pub fn new(
        api_base: String,
        access_token: SecretString,
        products: SheetRef,
        orders: SheetRef,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_base,
            access_token,
            products,
            orders,
        }
    }

    // =========================================================================
    // Products tab
    // =========================================================================

    /// All products in the mirror, optionally filtered by a case-insensitive
    /// substring over name and description (filtering happens client-side,
    /// the sheet has no query capability).
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` if the fetch fails; callers on read paths are
    /// expected to degrade to an empty list.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<MirroredProductRow>, SheetsError> {
        let values = self.fetch_values(&self.products).await?;
        let mut products: Vec<MirroredProductRow> = values
            .iter()
            .skip(1) // header
            .map(|row| MirroredProductRow::parse_row(row))
            .collect();

        if let Some(query) = query {
            let needle = query.to_lowercase();
            products.retain(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            });
        }

        Ok(products)
    }

    /// Append a product row, allocating the next sequential id.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` if the id scan or append fails.
    #[instrument(skip(self, row), fields(name = %row.name))]
    pub async fn add_product(
        &self,
        mut row: MirroredProductRow,
    ) -> Result<SheetRowId, SheetsError> {
        row.id = self.next_id(&self.products).await?;
        self.append_row(&self.products, &row.to_row()).await?;
        debug!(id = %row.id, "product appended to mirror");
        Ok(row.id)
    }

    /// Overwrite the non-id columns of the product row carrying `id`.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError::RowNotFound` if no row carries the id.
    #[instrument(skip(self, row))]
    pub async fn update_product(
        &self,
        id: SheetRowId,
        row: &MirroredProductRow,
    ) -> Result<(), SheetsError> {
        let row_number = self.find_row_by_id(&self.products, id).await?;
        let cells = row.to_row();
        let values: Vec<String> = cells.into_iter().skip(1).collect(); // keep id cell
        let range = format!(
            "B{row_number}:{}{row_number}",
            column_letter(values.len() + 1)
        );
        self.update_range(&self.products, &range, vec![values])
            .await?;
        debug!(%id, "product updated in mirror");
        Ok(())
    }

    /// Delete the product row carrying `id`.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError::RowNotFound` if no row carries the id.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: SheetRowId) -> Result<(), SheetsError> {
        let row_number = self.find_row_by_id(&self.products, id).await?;
        self.delete_row(&self.products, row_number).await?;
        debug!(%id, "product deleted from mirror");
        Ok(())
    }

    // =========================================================================
    // Orders tab
    // =========================================================================

    /// All orders in the mirror.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` if the fetch fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<MirroredOrderRow>, SheetsError> {
        let values = self.fetch_values(&self.orders).await?;
        Ok(values
            .iter()
            .skip(1)
            .map(|row| MirroredOrderRow::parse_row(row))
            .collect())
    }

    /// Append an order row, allocating the next sequential id.
    ///
    /// This is the checkout workflow's best-effort mirror write; the caller
    /// logs and swallows any error.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` if the id scan or append fails.
    #[instrument(skip(self, row), fields(user_id = row.user_id))]
    pub async fn append_order(&self, mut row: MirroredOrderRow) -> Result<SheetRowId, SheetsError> {
        row.id = self.next_id(&self.orders).await?;
        self.append_row(&self.orders, &row.to_row()).await?;
        debug!(id = %row.id, "order appended to mirror");
        Ok(row.id)
    }

    /// Update the status cell of the order row carrying `id`.
    ///
    /// The status column is located by scanning the header row, so the tab
    /// may be rearranged without breaking this call.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError::RowNotFound` if no row carries the id, or
    /// `SheetsError::MissingColumn` if the header row has no `status` column.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: SheetRowId,
        status: &str,
    ) -> Result<(), SheetsError> {
        let values = self.fetch_values(&self.orders).await?;

        let header = values.first().ok_or(SheetsError::MissingColumn("status"))?;
        let status_col = header
            .iter()
            .position(|h| h == "status")
            .ok_or(SheetsError::MissingColumn("status"))?;

        let row_number =
            find_row_in_values(&values, id).ok_or(SheetsError::RowNotFound(id.as_i64()))?;

        self.update_cell(&self.orders, row_number, status_col + 1, status)
            .await?;
        debug!(%id, status, "order status updated in mirror");
        Ok(())
    }

    // =========================================================================
    // Row primitives
    // =========================================================================

    /// Fetch every cell of a tab.
    async fn fetch_values(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base, sheet.spreadsheet_id, sheet.title
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        let response = check_status(response).await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::Response(e.to_string()))?;

        Ok(range.values)
    }

    /// Append one row after the last data row of a tab.
    async fn append_row(&self, sheet: &SheetRef, values: &[String]) -> Result<(), SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}!A1:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.api_base, sheet.spreadsheet_id, sheet.title
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&json!({ "values": [values] }))
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    /// Overwrite a single cell (1-based row and column).
    async fn update_cell(
        &self,
        sheet: &SheetRef,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetsError> {
        let range = format!("{}{row}", column_letter(col));
        self.update_range(sheet, &range, vec![vec![value.to_owned()]])
            .await
    }

    /// Overwrite a rectangular range.
    async fn update_range(
        &self,
        sheet: &SheetRef,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}!{range}?valueInputOption=USER_ENTERED",
            self.api_base, sheet.spreadsheet_id, sheet.title
        );

        let response = self
            .client
            .put(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    /// Structurally delete one row (1-based).
    async fn delete_row(&self, sheet: &SheetRef, row: usize) -> Result<(), SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.api_base, sheet.spreadsheet_id
        );

        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet.grid_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    }
                }
            }]
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    /// Locate the 1-based row number whose id column equals `id`.
    async fn find_row_by_id(&self, sheet: &SheetRef, id: SheetRowId) -> Result<usize, SheetsError> {
        let values = self.fetch_values(sheet).await?;
        find_row_in_values(&values, id).ok_or(SheetsError::RowNotFound(id.as_i64()))
    }

    /// Next sequential id: max of the numeric ids in column A, plus one.
    async fn next_id(&self, sheet: &SheetRef) -> Result<SheetRowId, SheetsError> {
        let values = self.fetch_values(sheet).await?;
        Ok(next_id_in_values(&values))
    }
}

/// Map a non-success HTTP response to `SheetsError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SheetsError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Linear scan of the id column (header skipped); returns a 1-based row
/// number.
fn find_row_in_values(values: &[Vec<String>], id: SheetRowId) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            row.first()
                .and_then(|cell| cell.parse::<i64>().ok())
                .is_some_and(|row_id| row_id == id.as_i64())
        })
        .map(|(index, _)| index + 1)
}

/// Max numeric id in column A plus one; 1 for an empty sheet.
fn next_id_in_values(values: &[Vec<String>]) -> SheetRowId {
    let max = values
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|cell| cell.parse::<i64>().ok())
        .max()
        .unwrap_or(0);
    SheetRowId::new(max + 1)
}

/// 1-based column index to A1 letter(s), e.g. 1 -> A, 27 -> AA.
fn column_letter(mut col: usize) -> String {
    debug_assert!(col >= 1);
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(u8::try_from(rem).map_or('A', |r| char::from(b'A' + r)));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sheets::rows::ORDER_HEADERS;

    fn sheet(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|s| (*s).to_owned()).collect())
            .collect()
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(17), "Q");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
    }

    #[test]
    fn test_next_id_empty_sheet() {
        assert_eq!(next_id_in_values(&[]), SheetRowId::new(1));
        // Header only
        assert_eq!(
            next_id_in_values(&sheet(&[&["id", "name"]])),
            SheetRowId::new(1)
        );
    }

    #[test]
    fn test_next_id_skips_non_numeric() {
        let values = sheet(&[&["id"], &["3"], &["junk"], &["7"], &[""]]);
        assert_eq!(next_id_in_values(&values), SheetRowId::new(8));
    }

    #[test]
    fn test_find_row_skips_header() {
        // A data row whose id happens to equal a header cell must not match
        // the header row itself.
        let values = sheet(&[&["id"], &["1"], &["2"]]);
        assert_eq!(find_row_in_values(&values, SheetRowId::new(2)), Some(3));
        assert_eq!(find_row_in_values(&values, SheetRowId::new(9)), None);
    }

    #[test]
    fn test_order_headers_match_row_width() {
        assert_eq!(ORDER_HEADERS.len(), 17);
    }
}
