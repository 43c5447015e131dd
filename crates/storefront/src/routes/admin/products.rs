//! Admin CSV product import.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::import::import_products_csv;
use crate::state::AppState;

/// Import products from an uploaded CSV file.
///
/// Expects a multipart field named `file` with a `.csv` filename. Bad rows
/// are skipped and reported; the rest of the file still imports.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn import(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::BadRequest("No file part".to_owned()));
    };
    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_owned()));
    }
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(AppError::BadRequest(
            "Allowed file types are CSV.".to_owned(),
        ));
    }

    let report = import_products_csv(state.pool(), &bytes).await?;

    info!(
        filename,
        imported = report.imported,
        updated = report.updated,
        errors = report.errors.len(),
        "CSV import complete"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!(
                "Products imported successfully! New: {}, Updated: {}.",
                report.imported, report.updated
            ),
            "errors": report.errors,
        })),
    ))
}
