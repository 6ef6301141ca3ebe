use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_message, validate_name};
use super::{ApiError, ApiResponse, AppState};

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let name = validate_name(&payload.name)?.to_string();
    let email = validate_email(&payload.email)?;
    let message = validate_message(&payload.message)?.to_string();

    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    state
        .store()
        .add_contact_message(&name, &email, subject, &message)
        .await?;

    // Acknowledgement mail never blocks or fails the submission.
    let mailer = state.mailer().clone();
    tokio::spawn(async move {
        mailer.send_contact_acknowledgement(&email, &name).await;
    });

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Thank you for your message! We will get back to you soon.",
    )))
}
