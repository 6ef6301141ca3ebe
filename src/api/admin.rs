use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_id, validate_name, validate_phone};
use super::{ApiError, ApiResponse, AppState, EventDto, RegistrationDto, UserDto};
use crate::db::{BookInput, BulkAction, EventInput};
use crate::entities::{books, contact_messages};

// ============================================================================
// Users
// ============================================================================

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkUsersRequest {
    pub action: String,
    pub user_ids: Vec<i32>,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.store().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let name = validate_name(&payload.name)?;
    let email = validate_email(&payload.email)?;
    let phone = validate_phone(&payload.phone)?;

    if payload.role != "user" && payload.role != "admin" {
        return Err(ApiError::validation("Role must be 'user' or 'admin'"));
    }

    let min_length = state.config().security.min_password_length;
    super::validation::validate_password(&payload.password, min_length)?;

    // Admin-created accounts skip the verification round trip.
    let (user_id, _) = state
        .store()
        .create_user(
            name,
            &email,
            phone,
            &payload.password,
            &payload.role,
            true,
            &state.config().security,
        )
        .await?
        .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

    let user = state
        .store()
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::internal("User vanished after insert"))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("user", id)?;

    if let Some(role) = &payload.role
        && role != "user"
        && role != "admin"
    {
        return Err(ApiError::validation("Role must be 'user' or 'admin'"));
    }
    if let Some(status) = &payload.status
        && status != "active"
        && status != "disabled"
    {
        return Err(ApiError::validation("Status must be 'active' or 'disabled'"));
    }

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    // Demoting or disabling the last active admin would lock everyone out.
    let loses_admin = user.is_admin()
        && user.is_active()
        && (payload.role.as_deref() == Some("user")
            || payload.status.as_deref() == Some("disabled"));
    if loses_admin && state.store().remaining_admins_excluding(&[id]).await? == 0 {
        return Err(ApiError::LastAdmin);
    }

    state
        .store()
        .update_user_role_and_status(id, payload.role.as_deref(), payload.status.as_deref())
        .await?;

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("user", id)?;

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    if user.is_admin() && state.store().remaining_admins_excluding(&[id]).await? == 0 {
        return Err(ApiError::LastAdmin);
    }

    state.store().delete_user(id).await?;

    Ok(Json(ApiResponse::success_with_message((), "User deleted")))
}

/// POST /admin/users/bulk
pub async fn bulk_users(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkUsersRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if payload.user_ids.is_empty() {
        return Err(ApiError::validation("user_ids cannot be empty"));
    }

    let action = match payload.action.as_str() {
        "delete" => BulkAction::Delete,
        "make_admin" => BulkAction::MakeAdmin,
        "remove_admin" => BulkAction::RemoveAdmin,
        "disable" => BulkAction::Disable,
        other => {
            return Err(ApiError::validation(format!(
                "Unknown bulk action: {other}"
            )));
        }
    };

    // Any action that can strip admin access must leave at least one
    // active admin outside the affected set.
    if matches!(
        action,
        BulkAction::Delete | BulkAction::RemoveAdmin | BulkAction::Disable
    ) && state
        .store()
        .remaining_admins_excluding(&payload.user_ids)
        .await?
        == 0
    {
        return Err(ApiError::LastAdmin);
    }

    let affected = state
        .store()
        .apply_user_bulk_action(action, &payload.user_ids)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        (),
        format!("Updated {affected} user(s)"),
    )))
}

// ============================================================================
// Events
// ============================================================================

#[derive(Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_date: String,
    pub event_time: String,
    pub location: String,
    #[serde(default)]
    pub price: f64,
    pub max_participants: i32,
    #[serde(default = "default_event_status")]
    pub status: String,
    pub image_url: Option<String>,
}

fn default_event_status() -> String {
    "active".to_string()
}

fn event_input(payload: &EventRequest) -> Result<EventInput, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.event_date.trim().is_empty() || payload.event_time.trim().is_empty() {
        return Err(ApiError::validation("Event date and time are required"));
    }
    if payload.max_participants <= 0 {
        return Err(ApiError::validation(
            "max_participants must be a positive integer",
        ));
    }
    if payload.status != "active" && payload.status != "inactive" {
        return Err(ApiError::validation("Status must be 'active' or 'inactive'"));
    }

    Ok(EventInput {
        title: payload.title.trim().to_string(),
        description: payload.description.clone(),
        event_date: payload.event_date.trim().to_string(),
        event_time: payload.event_time.trim().to_string(),
        location: payload.location.trim().to_string(),
        price: payload.price,
        max_participants: payload.max_participants,
        status: payload.status.clone(),
        image_url: payload.image_url.clone(),
    })
}

/// GET /admin/events — includes inactive events.
pub async fn list_all_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    let events = state.store().list_all_events().await?;
    Ok(Json(ApiResponse::success(
        events.into_iter().map(EventDto::from).collect(),
    )))
}

/// POST /admin/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let input = event_input(&payload)?;
    let id = state.store().create_event(&input).await?;

    let event = state
        .store()
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::internal("Event vanished after insert"))?;

    Ok(Json(ApiResponse::success(EventDto::from(event))))
}

/// PUT /admin/events/{id}
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let id = validate_id("event", id)?;
    let input = event_input(&payload)?;

    match state.store().update_event(id, &input).await? {
        None => Err(ApiError::not_found("Event", id)),
        Some(false) => Err(ApiError::Conflict(
            "Capacity cannot be reduced below the seats already reserved".to_string(),
        )),
        Some(true) => {
            let event = state
                .store()
                .get_event(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Event", id))?;
            Ok(Json(ApiResponse::success(EventDto::from(event))))
        }
    }
}

/// DELETE /admin/events/{id}
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("event", id)?;

    if !state.store().delete_event(id).await? {
        return Err(ApiError::not_found("Event", id));
    }

    Ok(Json(ApiResponse::success_with_message((), "Event deleted")))
}

/// GET /admin/events/{id}/registrations
pub async fn event_registrations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<RegistrationDto>>>, ApiError> {
    let id = validate_id("event", id)?;

    state
        .store()
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event", id))?;

    let rows = state.store().list_registrations_for_event(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(RegistrationDto::from).collect(),
    )))
}

// ============================================================================
// Contact inbox
// ============================================================================

#[derive(Deserialize)]
pub struct ContactListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /admin/contact
pub async fn list_contact_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ApiResponse<Vec<contact_messages::Model>>>, ApiError> {
    let messages = state.store().list_contact_messages(query.unread_only).await?;
    Ok(Json(ApiResponse::success(messages)))
}

/// PUT /admin/contact/{id}/read
pub async fn mark_message_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("message", id)?;

    if !state.store().mark_contact_message_read(id).await? {
        return Err(ApiError::not_found("Message", id));
    }

    Ok(Json(ApiResponse::success_with_message((), "Marked as read")))
}

// ============================================================================
// Books
// ============================================================================

#[derive(Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub cover_image: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

fn book_input(payload: &BookRequest) -> Result<BookInput, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.author.trim().is_empty() {
        return Err(ApiError::validation("Author is required"));
    }

    Ok(BookInput {
        title: payload.title.trim().to_string(),
        author: payload.author.trim().to_string(),
        genre: payload.genre.clone(),
        description: payload.description.clone(),
        price: payload.price,
        cover_image: payload.cover_image.clone(),
        available: payload.available,
    })
}

/// POST /admin/books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookRequest>,
) -> Result<Json<ApiResponse<books::Model>>, ApiError> {
    let input = book_input(&payload)?;
    let id = state.store().create_book(&input).await?;

    let book = state
        .store()
        .list_books(false)
        .await?
        .into_iter()
        .find(|b| b.id == id)
        .ok_or_else(|| ApiError::internal("Book vanished after insert"))?;

    Ok(Json(ApiResponse::success(book)))
}

/// PUT /admin/books/{id}
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<BookRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("book", id)?;
    let input = book_input(&payload)?;

    if !state.store().update_book(id, &input).await? {
        return Err(ApiError::not_found("Book", id));
    }

    Ok(Json(ApiResponse::success_with_message((), "Book updated")))
}

/// DELETE /admin/books/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("book", id)?;

    if !state.store().delete_book(id).await? {
        return Err(ApiError::not_found("Book", id));
    }

    Ok(Json(ApiResponse::success_with_message((), "Book deleted")))
}
