use axum::{
    Json,
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::validation::{validate_email, validate_name, validate_password, validate_phone};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::db::User;

/// Cookie-session key holding the server-side session token. The cookie
/// only names a row in the `sessions` table; identity is re-verified
/// against that table and the user row on every request.
const SESSION_TOKEN_KEY: &str = "session_token";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub token: String,
}

#[derive(Serialize)]
pub struct UserCreated {
    pub user_id: i32,
}

// ============================================================================
// Session helpers
// ============================================================================

/// Resolve the caller, if any: cookie -> sessions row -> active user.
/// Expired cookies and deleted/disabled users all resolve to None.
pub async fn maybe_user(state: &AppState, session: &Session) -> Result<Option<User>, ApiError> {
    let token: Option<String> = session
        .get(SESSION_TOKEN_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let Some(token) = token else {
        return Ok(None);
    };

    let Some(user_id) = state.store().touch_session(&token).await? else {
        return Ok(None);
    };

    let user = state.store().get_user(user_id).await?;
    Ok(user.filter(User::is_active))
}

pub async fn current_user(state: &AppState, session: &Session) -> Result<User, ApiError> {
    maybe_user(state, session)
        .await?
        .ok_or_else(ApiError::unauthorized)
}

/// Admin role is checked server-side per request, never taken from the
/// client.
pub async fn require_admin(state: &AppState, session: &Session) -> Result<User, ApiError> {
    let user = current_user(state, session).await?;
    if !user.is_admin() {
        return Err(ApiError::Forbidden("Administrator access required".to_string()));
    }
    Ok(user)
}

/// Route-layer guard for the /admin subtree.
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = require_admin(&state, &session).await?;
    tracing::Span::current().record("user_id", user.id);
    Ok(next.run(request).await)
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserCreated>>, ApiError> {
    let name = validate_name(&payload.name)?;
    let email = validate_email(&payload.email)?;
    let phone = validate_phone(&payload.phone)?;
    validate_password(&payload.password, state.config().security.min_password_length)?;

    if payload.password != payload.confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }

    let (user_id, verification_token) = state
        .store()
        .create_user(
            name,
            &email,
            phone,
            &payload.password,
            "user",
            false,
            &state.config().security,
        )
        .await?
        .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

    tracing::info!("New account registered: {email}");

    // Verification mail never blocks or fails the registration.
    if let Some(token) = verification_token {
        let mailer = state.mailer().clone();
        let name = name.to_string();
        tokio::spawn(async move {
            mailer.send_verification_email(&email, &name, &token).await;
        });
    }

    Ok(Json(ApiResponse::success_with_message(
        UserCreated { user_id },
        "Registration successful! Please check your email to verify your account.",
    )))
}

/// GET /auth/verify — redeems the token mailed at registration.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let token = query.token.trim();
    if token.is_empty() {
        return Err(ApiError::validation("Invalid verification token"));
    }

    if !state.store().verify_email_token(token).await? {
        return Err(ApiError::NotFound(
            "Invalid or expired verification token".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Email verified successfully! You can now login.",
    )))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let email = validate_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .store()
        .verify_credentials(&email, &payload.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !user.is_active() {
        return Err(ApiError::Forbidden(
            "Your account has been deactivated".to_string(),
        ));
    }

    if !user.is_verified {
        return Err(ApiError::Forbidden(
            "Please verify your email address before logging in".to_string(),
        ));
    }

    // One server-side session row per login; the cookie only carries the token.
    let token = Uuid::new_v4().to_string();
    state
        .store()
        .create_session(
            &token,
            user.id,
            client_ip(&headers).as_deref(),
            user_agent(&headers).as_deref(),
        )
        .await?;

    session
        .insert(SESSION_TOKEN_KEY, &token)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!("User logged in: {}", user.email);

    Ok(Json(ApiResponse::success_with_message(
        UserDto::from(user),
        "Login successful!",
    )))
}

/// POST /auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> impl IntoResponse {
    if let Ok(Some(token)) = session.get::<String>(SESSION_TOKEN_KEY).await
        && let Err(e) = state.store().delete_session(&token).await
    {
        tracing::warn!("Failed to delete session record: {e}");
    }

    let _ = session.flush().await;
    Json(ApiResponse::success_with_message((), "Logged out successfully"))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = current_user(&state, &session).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let name = validate_name(&payload.name)?;
    let phone = validate_phone(&payload.phone)?;

    state
        .store()
        .update_user_profile(user.id, name, phone)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Profile updated successfully",
    )))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let min_length = state.config().security.min_password_length;
    validate_password(&payload.new_password, min_length)?;

    if payload.current_password == payload.new_password {
        return Err(ApiError::validation(
            "New password must be different from current password",
        ));
    }

    let is_valid = state
        .store()
        .verify_user_password(user.id, &payload.current_password)
        .await?;

    if !is_valid {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    state
        .store()
        .update_user_password(user.id, &payload.new_password, &state.config().security)
        .await?;

    tracing::info!("Password changed for user: {}", user.email);

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Password changed successfully",
    )))
}

/// DELETE /auth/account
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let is_valid = state
        .store()
        .verify_user_password(user.id, &payload.password)
        .await?;

    if !is_valid {
        return Err(ApiError::validation("Password is incorrect"));
    }

    // The site must never end up without an administrator.
    if user.is_admin() && state.store().remaining_admins_excluding(&[user.id]).await? == 0 {
        return Err(ApiError::LastAdmin);
    }

    state.store().delete_sessions_for_user(user.id).await?;
    state.store().delete_user(user.id).await?;
    let _ = session.flush().await;

    tracing::info!("Account deleted: {}", user.email);

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Account deleted",
    )))
}
