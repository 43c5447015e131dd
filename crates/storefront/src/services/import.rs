//! CSV product import.
//!
//! Admins upload a CSV with columns `name, description, price, image_url,
//! stock`. Rows merge into the catalog by product name (the same natural key
//! the spreadsheet sync uses). Bad rows are skipped and reported without
//! aborting the rest of the file.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument};

use farmgate_core::Price;

use crate::db::products::{ProductRepository, UpsertOutcome};
use crate::db::RepositoryError;
use crate::models::product::ProductFields;

/// Columns every import file must carry.
const EXPECTED_COLUMNS: [&str; 5] = ["name", "description", "price", "image_url", "stock"];

/// Errors that abort an import outright (per-row problems are collected in
/// the [`ImportReport`] instead).
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file is missing one of the expected header columns.
    #[error("CSV must contain \"name\", \"description\", \"price\", \"image_url\", \"stock\" columns")]
    MissingColumns,

    /// The file could not be parsed as CSV at all.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Database failure while upserting.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Rows inserted as new products.
    pub imported: usize,
    /// Rows merged into existing products by name.
    pub updated: usize,
    /// Per-row problems, e.g. `Row 3: invalid price`.
    pub errors: Vec<String>,
}

/// Import products from CSV bytes, upserting by name.
///
/// # Errors
///
/// Returns [`ImportError`] for file-level failures; row-level failures are
/// collected in the report.
#[instrument(skip(pool, bytes), fields(len = bytes.len()))]
pub async fn import_products_csv(
    pool: &SqlitePool,
    bytes: &[u8],
) -> Result<ImportReport, ImportError> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers()?.clone();
    let index_of = |column: &str| headers.iter().position(|h| h.trim() == column);

    let Some(cols) = EXPECTED_COLUMNS
        .iter()
        .map(|&c| index_of(c))
        .collect::<Option<Vec<_>>>()
    else {
        return Err(ImportError::MissingColumns);
    };
    let [name_col, description_col, price_col, image_col, stock_col] = cols.as_slice() else {
        return Err(ImportError::MissingColumns);
    };

    let products = ProductRepository::new(pool);
    let mut report = ImportReport::default();

    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                report.errors.push(format!("Row {row_number}: {e}"));
                continue;
            }
        };

        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let name = field(*name_col);
        if name.is_empty() {
            report
                .errors
                .push(format!("Row {row_number}: product name is required"));
            continue;
        }

        let price = match Price::parse(field(*price_col)) {
            Ok(price) if price.amount() > Decimal::ZERO => price,
            _ => {
                report
                    .errors
                    .push(format!("Row {row_number}: invalid price"));
                continue;
            }
        };

        let stock: i64 = match field(*stock_col).parse() {
            Ok(stock) if stock >= 0 => stock,
            _ => {
                report
                    .errors
                    .push(format!("Row {row_number}: invalid stock"));
                continue;
            }
        };

        let optional = |value: &str| {
            if value.is_empty() {
                None
            } else {
                Some(value.to_owned())
            }
        };

        let fields = ProductFields {
            name: name.to_owned(),
            description: optional(field(*description_col)),
            price,
            image_url: optional(field(*image_col)),
            stock,
        };

        match products.upsert_by_name(&fields).await? {
            UpsertOutcome::Inserted => report.imported += 1,
            UpsertOutcome::Updated => report.updated += 1,
        }
    }

    info!(
        imported = report.imported,
        updated = report.updated,
        errors = report.errors.len(),
        "product import finished"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_inserts_and_updates_by_name() {
        let pool = crate::test_util::test_pool().await;

        let csv = b"name,description,price,image_url,stock\n\
                    Organic Tomatoes,Fresh and ripe,2.50,/img/tomato.jpg,100\n\
                    Farm Fresh Eggs,Free-range,3.00,,50\n";
        let report = import_products_csv(&pool, csv).await.unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.updated, 0);
        assert!(report.errors.is_empty());

        // Re-import with a new price for one product: merged by name.
        let csv = b"name,description,price,image_url,stock\n\
                    Organic Tomatoes,Fresh and ripe,2.75,/img/tomato.jpg,80\n";
        let report = import_products_csv(&pool, csv).await.unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.updated, 1);

        let products = ProductRepository::new(&pool);
        let all = products.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        let tomatoes = all.iter().find(|p| p.name == "Organic Tomatoes").unwrap();
        assert_eq!(tomatoes.price, Price::parse("2.75").unwrap());
        assert_eq!(tomatoes.stock, 80);
    }

    #[tokio::test]
    async fn test_import_collects_row_errors() {
        let pool = crate::test_util::test_pool().await;

        let csv = b"name,description,price,image_url,stock\n\
                    ,missing name,2.50,,10\n\
                    Spinach Bunch,ok,0,,10\n\
                    Brown Rice,ok,2.80,,-4\n\
                    Fresh Milk,ok,1.50,,80\n";
        let report = import_products_csv(&pool, csv).await.unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("Row 1:"));
        assert!(report.errors[1].contains("invalid price"));
        assert!(report.errors[2].contains("invalid stock"));
    }

    #[tokio::test]
    async fn test_import_rejects_missing_columns() {
        let pool = crate::test_util::test_pool().await;

        let csv = b"name,price\nEggs,3.00\n";
        assert!(matches!(
            import_products_csv(&pool, csv).await,
            Err(ImportError::MissingColumns)
        ));
    }

    #[tokio::test]
    async fn test_import_reorders_columns_by_header() {
        let pool = crate::test_util::test_pool().await;

        let csv = b"stock,name,image_url,price,description\n\
                    40,Chicken Breast,/img/chicken.jpg,8.50,Boneless\n";
        let report = import_products_csv(&pool, csv).await.unwrap();
        assert_eq!(report.imported, 1);

        let products = ProductRepository::new(&pool);
        let all = products.list(Some("chicken")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].stock, 40);
        assert_eq!(all[0].price, Price::parse("8.50").unwrap());
    }
}
