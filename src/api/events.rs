use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, maybe_user};
use super::validation::{
    validate_email, validate_guests, validate_id, validate_name, validate_phone,
};
use super::{
    ApiError, ApiResponse, AppState, ErrorCode, EventDetailDto, EventDto, RegisterEventRequest,
    RegistrationCreated, RegistrationDto,
};
use crate::services::{CancelIdentity, ReservationError, ReservationRequest};

#[derive(Deserialize)]
pub struct GetEventQuery {
    pub user_id: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    /// Lets guests cancel a registration made without an account.
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    let events = state.store().list_active_events().await?;
    let dtos = events.into_iter().map(EventDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /events/{id}
///
/// `is_registered` is resolved from the session when one exists; the
/// `user_id` query parameter is honored only for the lookup, never as
/// proof of identity.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Query(query): Query<GetEventQuery>,
) -> Result<Json<ApiResponse<EventDetailDto>>, ApiError> {
    let id = validate_id("event", id)?;

    let event = state
        .store()
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event", id))?;

    let is_registered = if let Some(user) = maybe_user(&state, &session).await? {
        state.store().is_email_registered(id, &user.email).await?
    } else if let Some(user_id) = query.user_id {
        state.store().is_user_registered(id, user_id).await?
    } else {
        false
    };

    let dto = EventDto::from(event);
    let available_spots = dto.seats_available;

    Ok(Json(ApiResponse::success(EventDetailDto {
        event: dto,
        available_spots,
        is_registered,
    })))
}

/// GET /events/registrations — the session user's registrations.
pub async fn my_registrations(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<RegistrationDto>>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let rows = state.store().list_registrations_for_user(user.id).await?;
    let dtos = rows.into_iter().map(RegistrationDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /events/register
///
/// Guest registration is allowed; an authenticated session links the
/// registration to the account and pins the email identity. Validation
/// failures are HTTP 400; business-rule rejections come back as HTTP 200
/// with `success: false` and a machine-readable code.
pub async fn register_for_event(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterEventRequest>,
) -> Result<Json<ApiResponse<RegistrationCreated>>, ApiError> {
    let event_id = validate_id("event", payload.event_id)?;
    let name = validate_name(&payload.name)?.to_string();
    let email = validate_email(&payload.email)?;
    let phone = validate_phone(&payload.phone)?.to_string();
    let guests = validate_guests(payload.guests)?;

    // Session identity wins over anything the client asserts in the body.
    let user = maybe_user(&state, &session).await?;
    let (user_id, email) = match user {
        Some(user) => (Some(user.id), user.email),
        None => (None, email),
    };

    let outcome = state
        .reservations()
        .reserve(ReservationRequest {
            event_id,
            user_id,
            name: name.clone(),
            email: email.clone(),
            phone,
            guests,
        })
        .await;

    match outcome {
        Ok(outcome) => {
            // Confirmation mail is best-effort: the reservation is already
            // committed and stays committed.
            let mailer = state.mailer().clone();
            tokio::spawn(async move {
                mailer
                    .send_registration_confirmation(
                        &email,
                        &name,
                        &outcome.event_title,
                        &outcome.event_date,
                        &outcome.event_time,
                    )
                    .await;
            });

            Ok(Json(ApiResponse::success_with_message(
                RegistrationCreated {
                    registration_id: outcome.registration_id,
                },
                "Registration successful! You will receive a confirmation email shortly.",
            )))
        }
        Err(err) => rejection_or_error(err),
    }
}

/// POST /events/registrations/{id}/cancel
///
/// Soft transition `confirmed -> cancelled`; the row is kept and the seats
/// go back to the pool in the same transaction.
pub async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    payload: Option<Json<CancelRequest>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("registration", id)?;

    let identity = if let Some(user) = maybe_user(&state, &session).await? {
        if user.is_admin() {
            CancelIdentity::Admin
        } else {
            CancelIdentity::User(user.id)
        }
    } else {
        let email = payload
            .and_then(|Json(body)| body.email)
            .ok_or_else(ApiError::unauthorized)?;
        CancelIdentity::Email(validate_email(&email)?)
    };

    match state.reservations().cancel(id, identity).await {
        Ok(outcome) => Ok(Json(ApiResponse::success_with_message(
            (),
            format!(
                "Registration cancelled, {} seat(s) released",
                outcome.seats_restored
            ),
        ))),
        Err(err) => rejection_or_error(err),
    }
}

/// Business-rule refusals travel as HTTP 200 with `success: false`;
/// everything else escalates to a proper error status.
fn rejection_or_error<T>(err: ReservationError) -> Result<Json<ApiResponse<T>>, ApiError> {
    let code = match &err {
        ReservationError::EventNotFound => ErrorCode::EventNotFound,
        ReservationError::EventInactive => ErrorCode::EventInactive,
        ReservationError::EventFull => ErrorCode::EventFull,
        ReservationError::AlreadyRegistered => ErrorCode::AlreadyRegistered,
        ReservationError::RegistrationNotFound => ErrorCode::NotFound,
        ReservationError::NotConfirmed => ErrorCode::NotConfirmed,
        ReservationError::Forbidden => {
            return Err(ApiError::Forbidden(
                "Not allowed to modify this registration".to_string(),
            ));
        }
        ReservationError::Validation(msg) => return Err(ApiError::validation(msg.clone())),
        ReservationError::Database(msg) => return Err(ApiError::DatabaseError(msg.clone())),
    };

    Ok(Json(ApiResponse::rejection(code, err.to_string())))
}
