//! `SeaORM` implementation of the `ReservationService` trait.
//!
//! The whole read-check-write sequence runs inside a single database
//! transaction, and the seat decrement itself is a conditional UPDATE
//! (`... SET seats_available = seats_available - ? WHERE id = ? AND
//! seats_available >= ?`). Two requests racing for the last seat cannot both
//! pass the guard: the second observes zero affected rows and is refused.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};

use crate::db::Store;
use crate::entities::{event_registrations, events, prelude::*};
use crate::services::reservation::{
    CancelIdentity, CancellationOutcome, ReservationError, ReservationOutcome,
    ReservationRequest, ReservationService,
};

pub struct SeaOrmReservationService {
    store: Store,
}

impl SeaOrmReservationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE constraint failed") || msg.contains("unique constraint")
}

#[async_trait]
impl ReservationService for SeaOrmReservationService {
    async fn reserve(
        &self,
        request: ReservationRequest,
    ) -> Result<ReservationOutcome, ReservationError> {
        let email = request.email.trim().to_lowercase();

        let txn = self.store.conn.begin().await?;

        // Precondition order is part of the contract: existence/activity,
        // then capacity, then duplicates.
        let event = Events::find_by_id(request.event_id)
            .one(&txn)
            .await?
            .ok_or(ReservationError::EventNotFound)?;

        if event.status != "active" {
            return Err(ReservationError::EventInactive);
        }

        if event.seats_available < request.guests {
            return Err(ReservationError::EventFull);
        }

        let duplicate = EventRegistrations::find()
            .filter(event_registrations::Column::EventId.eq(request.event_id))
            .filter(event_registrations::Column::Email.eq(email.clone()))
            .filter(event_registrations::Column::Status.eq("confirmed"))
            .one(&txn)
            .await?;

        if duplicate.is_some() {
            return Err(ReservationError::AlreadyRegistered);
        }

        // Conditional decrement. The `seats_available >= guests` filter makes
        // the check-then-act safe under concurrency: losing racers affect
        // zero rows and the transaction never touches the counter.
        let update = Events::update_many()
            .col_expr(
                events::Column::SeatsAvailable,
                Expr::col(events::Column::SeatsAvailable).sub(request.guests),
            )
            .filter(events::Column::Id.eq(request.event_id))
            .filter(events::Column::Status.eq("active"))
            .filter(events::Column::SeatsAvailable.gte(request.guests))
            .exec(&txn)
            .await?;

        if update.rows_affected == 0 {
            return Err(ReservationError::EventFull);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let registration = event_registrations::ActiveModel {
            event_id: Set(request.event_id),
            user_id: Set(request.user_id),
            name: Set(request.name),
            email: Set(email),
            phone: Set(request.phone),
            guests: Set(request.guests),
            status: Set("confirmed".to_string()),
            created_at: Set(now),
            cancelled_at: Set(None),
            ..Default::default()
        };

        // The partial unique index on (event_id, email) backstops the
        // duplicate pre-check against races between two transactions.
        let registration = registration.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                ReservationError::AlreadyRegistered
            } else {
                ReservationError::from(e)
            }
        })?;

        txn.commit().await?;

        Ok(ReservationOutcome {
            registration_id: registration.id,
            event_title: event.title,
            event_date: event.event_date,
            event_time: event.event_time,
        })
    }

    async fn cancel(
        &self,
        registration_id: i32,
        identity: CancelIdentity,
    ) -> Result<CancellationOutcome, ReservationError> {
        let txn = self.store.conn.begin().await?;

        let registration = EventRegistrations::find_by_id(registration_id)
            .one(&txn)
            .await?
            .ok_or(ReservationError::RegistrationNotFound)?;

        let owned = match &identity {
            CancelIdentity::Admin => true,
            CancelIdentity::User(user_id) => registration.user_id == Some(*user_id),
            CancelIdentity::Email(email) => {
                registration.email.eq_ignore_ascii_case(email.trim())
            }
        };
        if !owned {
            return Err(ReservationError::Forbidden);
        }

        if registration.status != "confirmed" {
            return Err(ReservationError::NotConfirmed);
        }

        let guests = registration.guests;
        let event_id = registration.event_id;

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: event_registrations::ActiveModel = registration.into();
        active.status = Set("cancelled".to_string());
        active.cancelled_at = Set(Some(now));
        active.update(&txn).await?;

        // Symmetric restore, capped at capacity so a drifted counter can
        // never exceed max_participants.
        let restored = Events::update_many()
            .col_expr(
                events::Column::SeatsAvailable,
                Expr::col(events::Column::SeatsAvailable).add(guests),
            )
            .filter(events::Column::Id.eq(event_id))
            .filter(
                Expr::col(events::Column::SeatsAvailable)
                    .add(guests)
                    .lte(Expr::col(events::Column::MaxParticipants)),
            )
            .exec(&txn)
            .await?;

        // A drifted counter would overshoot the guard above; clamp it to
        // capacity instead of leaving the cancelled seats unrestored.
        if restored.rows_affected == 0 {
            Events::update_many()
                .col_expr(
                    events::Column::SeatsAvailable,
                    Expr::col(events::Column::MaxParticipants).into(),
                )
                .filter(events::Column::Id.eq(event_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(CancellationOutcome {
            registration_id,
            seats_restored: guests,
        })
    }
}
