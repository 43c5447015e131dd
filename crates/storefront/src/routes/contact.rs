//! Contact form handler.
//!
//! Submissions are validated and logged; there is no ticketing backend.

use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::error::{AppError, Result};

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Accept a contact form submission.
#[instrument(skip(form))]
pub async fn submit(Json(form): Json<ContactForm>) -> Result<impl IntoResponse> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.message.trim().is_empty()
    {
        return Err(AppError::BadRequest("All fields are required.".to_owned()));
    }

    info!(
        name = %form.name,
        email = %form.email,
        message = %form.message,
        "contact form submission"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Your message has been sent successfully!",
    })))
}
