use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{event_registrations, events, prelude::*};

/// Fields accepted when creating or updating an event.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub event_date: String,
    pub event_time: String,
    pub location: String,
    pub price: f64,
    pub max_participants: i32,
    pub status: String,
    pub image_url: Option<String>,
}

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<events::Model>> {
        Events::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query event")
    }

    pub async fn list_active(&self) -> Result<Vec<events::Model>> {
        Events::find()
            .filter(events::Column::Status.eq("active"))
            .order_by_asc(events::Column::EventDate)
            .all(&self.conn)
            .await
            .context("Failed to list active events")
    }

    pub async fn list_all(&self) -> Result<Vec<events::Model>> {
        Events::find()
            .order_by_asc(events::Column::EventDate)
            .all(&self.conn)
            .await
            .context("Failed to list events")
    }

    /// New events start with the full capacity available.
    pub async fn create(&self, input: &EventInput) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = events::ActiveModel {
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            event_date: Set(input.event_date.clone()),
            event_time: Set(input.event_time.clone()),
            location: Set(input.location.clone()),
            price: Set(input.price),
            max_participants: Set(input.max_participants),
            seats_available: Set(input.max_participants),
            status: Set(input.status.clone()),
            image_url: Set(input.image_url.clone()),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert event")?;

        Ok(model.id)
    }

    /// Update an event. Capacity changes keep `seats_available` consistent:
    /// the counter shifts by the capacity delta, and shrinking below the
    /// seats already claimed is refused (returns Ok(false)).
    pub async fn update(&self, id: i32, input: &EventInput) -> Result<Option<bool>> {
        let Some(event) = Events::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let claimed = event.max_participants - event.seats_available;
        if input.max_participants < claimed {
            return Ok(Some(false));
        }
        let new_available = input.max_participants - claimed;

        let mut active: events::ActiveModel = event.into();
        active.title = Set(input.title.clone());
        active.description = Set(input.description.clone());
        active.event_date = Set(input.event_date.clone());
        active.event_time = Set(input.event_time.clone());
        active.location = Set(input.location.clone());
        active.price = Set(input.price);
        active.max_participants = Set(input.max_participants);
        active.seats_available = Set(new_available);
        active.status = Set(input.status.clone());
        active.image_url = Set(input.image_url.clone());
        active.update(&self.conn).await?;

        Ok(Some(true))
    }

    /// Delete an event; registrations cascade.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Events::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected > 0)
    }

    /// Whether the given email currently holds a confirmed registration.
    pub async fn is_registered(&self, event_id: i32, email: &str) -> Result<bool> {
        let count = EventRegistrations::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .filter(event_registrations::Column::Email.eq(email.trim().to_lowercase()))
            .filter(event_registrations::Column::Status.eq("confirmed"))
            .count(&self.conn)
            .await
            .context("Failed to check registration")?;

        Ok(count > 0)
    }

    /// Whether the given user currently holds a confirmed registration.
    pub async fn is_user_registered(&self, event_id: i32, user_id: i32) -> Result<bool> {
        let count = EventRegistrations::find()
            .filter(event_registrations::Column::EventId.eq(event_id))
            .filter(event_registrations::Column::UserId.eq(user_id))
            .filter(event_registrations::Column::Status.eq("confirmed"))
            .count(&self.conn)
            .await
            .context("Failed to check registration")?;

        Ok(count > 0)
    }
}
