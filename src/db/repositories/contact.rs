use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{contact_messages, prelude::*};

pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<i32> {
        let active = contact_messages::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            subject: Set(subject.map(|s| s.trim().to_string())),
            message: Set(message.trim().to_string()),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert contact message")?;

        Ok(model.id)
    }

    pub async fn list(&self, unread_only: bool) -> Result<Vec<contact_messages::Model>> {
        let mut query = ContactMessages::find();
        if unread_only {
            query = query.filter(contact_messages::Column::IsRead.eq(false));
        }

        query
            .order_by_desc(contact_messages::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list contact messages")
    }

    pub async fn mark_read(&self, id: i32) -> Result<bool> {
        let Some(message) = ContactMessages::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: contact_messages::ActiveModel = message.into();
        active.is_read = Set(true);
        active.update(&self.conn).await?;

        Ok(true)
    }
}
