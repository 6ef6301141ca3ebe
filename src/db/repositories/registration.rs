use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{event_registrations, events, prelude::*};

/// A registration joined with its event, for dashboards and rosters.
#[derive(Debug, Clone)]
pub struct RegistrationRow {
    pub registration: event_registrations::Model,
    pub event: Option<events::Model>,
}

pub struct RegistrationRepository {
    conn: DatabaseConnection,
}

impl RegistrationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<event_registrations::Model>> {
        EventRegistrations::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query registration")
    }

    /// All registrations belonging to a user, newest first, with events.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<RegistrationRow>> {
        let rows = EventRegistrations::find()
            .filter(event_registrations::Column::UserId.eq(user_id))
            .order_by_desc(event_registrations::Column::CreatedAt)
            .find_also_related(events::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list registrations for user")?;

        Ok(rows
            .into_iter()
            .map(|(registration, event)| RegistrationRow {
                registration,
                event,
            })
            .collect())
    }

    /// Roster for one event, confirmed first.
    pub async fn list_for_event(&self, event_id: i32) -> Result<Vec<event_registrations::Model>> {
        EventRegistrations::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .order_by_asc(event_registrations::Column::Status)
            .order_by_asc(event_registrations::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list registrations for event")
    }
}
