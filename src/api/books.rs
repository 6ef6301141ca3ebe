use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::entities::books;

/// GET /books — the public catalog lists available titles only.
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<books::Model>>>, ApiError> {
    let books = state.store().list_books(true).await?;
    Ok(Json(ApiResponse::success(books)))
}
