//! Domain service for event seat reservation.
//!
//! Owns the one correctness-critical invariant of the system: the seat
//! counter on an event and its confirmed registrations must stay consistent
//! under concurrent requests. Registration and cancellation are symmetric
//! atomic units.

use serde::Serialize;
use thiserror::Error;

/// Why a reservation request was refused.
///
/// Callers branch on the variant, never on the message text. The API layer
/// serializes the matching [`ErrorCode`](crate::api::ErrorCode) alongside
/// the human-readable message.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Event not found")]
    EventNotFound,

    #[error("Event is not open for registration")]
    EventInactive,

    #[error("Not enough seats available")]
    EventFull,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("Registration not found")]
    RegistrationNotFound,

    #[error("Registration is not confirmed")]
    NotConfirmed,

    #[error("Not allowed to modify this registration")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ReservationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub event_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub guests: i32,
}

/// Outcome of a committed reservation.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationOutcome {
    pub registration_id: i32,
    pub event_title: String,
    pub event_date: String,
    pub event_time: String,
}

/// Outcome of a committed cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub registration_id: i32,
    pub seats_restored: i32,
}

/// Identity a caller presents when cancelling: either the session user or,
/// for guest registrations, the registration email. Admins bypass the check.
#[derive(Debug, Clone)]
pub enum CancelIdentity {
    User(i32),
    Email(String),
    Admin,
}

/// Domain service trait for the reservation workflow.
///
/// State machine per registration: `none -> confirmed -> cancelled`.
/// No other transitions; a duplicate confirm is rejected, not merged.
#[async_trait::async_trait]
pub trait ReservationService: Send + Sync {
    /// Reserves seats for an event as one atomic unit: the registration row
    /// insert and the seat-counter decrement commit or roll back together.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::EventNotFound`] / [`ReservationError::EventInactive`]
    ///   if the event is absent or closed
    /// - [`ReservationError::EventFull`] if fewer than `guests` seats remain
    /// - [`ReservationError::AlreadyRegistered`] on a second confirmed
    ///   registration for the same (event, email)
    async fn reserve(
        &self,
        request: ReservationRequest,
    ) -> Result<ReservationOutcome, ReservationError>;

    /// Cancels a confirmed registration, restoring its seats atomically.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::RegistrationNotFound`] if the row is absent
    /// - [`ReservationError::NotConfirmed`] if it was already cancelled
    /// - [`ReservationError::Forbidden`] if `identity` does not own it
    async fn cancel(
        &self,
        registration_id: i32,
        identity: CancelIdentity,
    ) -> Result<CancellationOutcome, ReservationError>;
}

/// Bounds on the guest count a single registration may claim.
pub const MIN_GUESTS: i32 = 1;
pub const MAX_GUESTS: i32 = 5;
