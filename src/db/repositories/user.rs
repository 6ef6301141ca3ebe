use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: String,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            status: model.status,
            is_verified: model.is_verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Bulk admin action on a set of user ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    MakeAdmin,
    RemoveAdmin,
    Disable,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Create a user with a freshly hashed password. Returns the new id and
    /// the verification token (None when created pre-verified), or None if
    /// the email is already taken.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
        role: &str,
        verified: bool,
        config: &SecurityConfig,
    ) -> Result<Option<(i32, Option<String>)>> {
        let email = email.trim().to_lowercase();

        if self.get_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let verification_token = (!verified).then(|| uuid::Uuid::new_v4().to_string());

        let now = chrono::Utc::now().to_rfc3339();
        let active = users::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email),
            phone: Set(phone.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            status: Set("active".to_string()),
            is_verified: Set(verified),
            verification_token: Set(verification_token.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(Some((model.id, verification_token)))
    }

    /// Redeem a one-shot verification token. Returns false when the token
    /// is unknown or already used.
    pub async fn verify_email(&self, token: &str) -> Result<bool> {
        let user = Users::find()
            .filter(users::Column::VerificationToken.eq(token))
            .filter(users::Column::IsVerified.eq(false))
            .one(&self.conn)
            .await
            .context("Failed to query user by verification token")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_verified = Set(true);
        active.verification_token = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Verify a password against the stored hash.
    /// Argon2 is CPU-intensive, so verification runs in a blocking task.
    pub async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        verify_hash(user.password_hash, password.to_string()).await
    }

    /// Verify credentials by email; returns the user on success.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query user for login")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let hash = user.password_hash.clone();
        if verify_hash(hash, password.to_string()).await? {
            Ok(Some(User::from(user)))
        } else {
            Ok(None)
        }
    }

    pub async fn update_profile(&self, user_id: i32, name: &str, phone: &str) -> Result<()> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.name = Set(name.trim().to_string());
        active.phone = Set(phone.trim().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn update_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn update_role_and_status(
        &self,
        user_id: i32,
        role: Option<&str>,
        status: Option<&str>,
    ) -> Result<()> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(role) = role {
            active.role = Set(role.to_string());
        }
        if let Some(status) = status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Delete a user; sessions cascade, registrations keep their guest data.
    pub async fn delete(&self, user_id: i32) -> Result<bool> {
        let result = Users::delete_by_id(user_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    /// Count active admins outside the given id set. Used to refuse
    /// operations that would leave the site without an administrator.
    pub async fn remaining_admins_excluding(&self, excluded_ids: &[i32]) -> Result<u64> {
        let count = Users::find()
            .filter(users::Column::Role.eq("admin"))
            .filter(users::Column::Status.eq("active"))
            .filter(users::Column::Id.is_not_in(excluded_ids.to_vec()))
            .count(&self.conn)
            .await
            .context("Failed to count remaining admins")?;

        Ok(count)
    }

    /// Apply a bulk action. The caller is responsible for the last-admin
    /// guard; this method only mutates. Returns affected row count.
    pub async fn apply_bulk(&self, action: BulkAction, user_ids: &[i32]) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();
        let affected = match action {
            BulkAction::Delete => {
                Users::delete_many()
                    .filter(users::Column::Id.is_in(user_ids.to_vec()))
                    .exec(&self.conn)
                    .await?
                    .rows_affected
            }
            BulkAction::MakeAdmin => {
                Users::update_many()
                    .col_expr(users::Column::Role, Expr::value("admin"))
                    .col_expr(users::Column::UpdatedAt, Expr::value(now.clone()))
                    .filter(users::Column::Id.is_in(user_ids.to_vec()))
                    .exec(&self.conn)
                    .await?
                    .rows_affected
            }
            BulkAction::RemoveAdmin => {
                Users::update_many()
                    .col_expr(users::Column::Role, Expr::value("user"))
                    .col_expr(users::Column::UpdatedAt, Expr::value(now.clone()))
                    .filter(users::Column::Id.is_in(user_ids.to_vec()))
                    .exec(&self.conn)
                    .await?
                    .rows_affected
            }
            BulkAction::Disable => {
                Users::update_many()
                    .col_expr(users::Column::Status, Expr::value("disabled"))
                    .col_expr(users::Column::UpdatedAt, Expr::value(now.clone()))
                    .filter(users::Column::Id.is_in(user_ids.to_vec()))
                    .exec(&self.conn)
                    .await?
                    .rows_affected
            }
        };

        Ok(affected)
    }
}

async fn verify_hash(password_hash: String, password: String) -> Result<bool> {
    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
