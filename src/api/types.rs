use serde::{Deserialize, Serialize};

use crate::db::{RegistrationRow, User};
use crate::entities::{event_registrations, events};

/// Machine-readable reason attached to every `success: false` body.
/// Clients branch on this, never on the message prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    LastAdmin,
    EventNotFound,
    EventInactive,
    EventFull,
    AlreadyRegistered,
    NotConfirmed,
    Database,
    Internal,
}

/// Every body carries `success` and a `message` string, even plain reads.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, "OK")
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            code: None,
        }
    }

    /// Business-rule rejection: travels with HTTP 200, carries a code.
    pub fn rejection(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(message),
            code: Some(code),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::rejection(code, message)
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: String,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            status: user.status,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub event_date: String,
    pub event_time: String,
    pub location: String,
    pub price: f64,
    pub max_participants: i32,
    pub seats_available: i32,
    pub current_participants: i32,
    pub status: String,
    pub image_url: Option<String>,
}

impl From<events::Model> for EventDto {
    fn from(event: events::Model) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            event_date: event.event_date,
            event_time: event.event_time,
            location: event.location,
            price: event.price,
            max_participants: event.max_participants,
            seats_available: event.seats_available,
            current_participants: event.max_participants - event.seats_available,
            status: event.status,
            image_url: event.image_url,
        }
    }
}

/// Single-event view: the list fields plus the caller's registration state.
#[derive(Debug, Serialize)]
pub struct EventDetailDto {
    #[serde(flatten)]
    pub event: EventDto,
    pub available_spots: i32,
    pub is_registered: bool,
}

#[derive(Debug, Serialize)]
pub struct RegistrationDto {
    pub id: i32,
    pub event_id: i32,
    pub name: String,
    pub email: String,
    pub guests: i32,
    pub status: String,
    pub created_at: String,
    pub cancelled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
}

impl From<event_registrations::Model> for RegistrationDto {
    fn from(model: event_registrations::Model) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            name: model.name,
            email: model.email,
            guests: model.guests,
            status: model.status,
            created_at: model.created_at,
            cancelled_at: model.cancelled_at,
            event_title: None,
            event_date: None,
            event_time: None,
        }
    }
}

impl From<RegistrationRow> for RegistrationDto {
    fn from(row: RegistrationRow) -> Self {
        let mut dto = Self::from(row.registration);
        if let Some(event) = row.event {
            dto.event_title = Some(event.title);
            dto.event_date = Some(event.event_date);
            dto.event_time = Some(event.event_time);
        }
        dto
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterEventRequest {
    pub event_id: i32,
    /// Accepted for wire compatibility; identity always comes from the
    /// server-side session, never from this field.
    #[serde(default)]
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_guests")]
    pub guests: i32,
}

const fn default_guests() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct RegistrationCreated {
    pub registration_id: i32,
}
