use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{prelude::*, sessions};

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Record a login. The token is the primary key; one row per login.
    pub async fn create(
        &self,
        token: &str,
        user_id: i32,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = sessions::ActiveModel {
            id: Set(token.to_string()),
            user_id: Set(user_id),
            ip_address: Set(ip_address.map(ToString::to_string)),
            user_agent: Set(user_agent.map(ToString::to_string)),
            created_at: Set(now.clone()),
            last_activity: Set(now),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert session")?;

        Ok(())
    }

    /// Resolve a token to its user id, bumping `last_activity`.
    /// Returns None for unknown tokens: a cookie alone proves nothing.
    pub async fn touch(&self, token: &str) -> Result<Option<i32>> {
        let Some(session) = Sessions::find_by_id(token).one(&self.conn).await? else {
            return Ok(None);
        };

        let user_id = session.user_id;
        let mut active: sessions::ActiveModel = session.into();
        active.last_activity = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(Some(user_id))
    }

    pub async fn delete(&self, token: &str) -> Result<()> {
        Sessions::delete_by_id(token)
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    pub async fn delete_for_user(&self, user_id: i32) -> Result<u64> {
        let result = Sessions::delete_many()
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete sessions for user")?;

        Ok(result.rows_affected)
    }
}
