use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{books, contact_messages, event_registrations, events};

pub mod migrator;
pub mod repositories;

pub use repositories::book::BookInput;
pub use repositories::event::EventInput;
pub use repositories::registration::RegistrationRow;
pub use repositories::user::{BulkAction, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn registration_repo(&self) -> repositories::registration::RegistrationRepository {
        repositories::registration::RegistrationRepository::new(self.conn.clone())
    }

    fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    fn book_repo(&self) -> repositories::book::BookRepository {
        repositories::book::BookRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
        role: &str,
        verified: bool,
        config: &SecurityConfig,
    ) -> Result<Option<(i32, Option<String>)>> {
        self.user_repo()
            .create(name, email, phone, password, role, verified, config)
            .await
    }

    pub async fn verify_email_token(&self, token: &str) -> Result<bool> {
        self.user_repo().verify_email(token).await
    }

    pub async fn verify_user_password(&self, user_id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password(user_id, password).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user_profile(&self, user_id: i32, name: &str, phone: &str) -> Result<()> {
        self.user_repo().update_profile(user_id, name, phone).await
    }

    pub async fn update_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn update_user_role_and_status(
        &self,
        user_id: i32,
        role: Option<&str>,
        status: Option<&str>,
    ) -> Result<()> {
        self.user_repo()
            .update_role_and_status(user_id, role, status)
            .await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        self.user_repo().delete(user_id).await
    }

    pub async fn remaining_admins_excluding(&self, excluded_ids: &[i32]) -> Result<u64> {
        self.user_repo()
            .remaining_admins_excluding(excluded_ids)
            .await
    }

    pub async fn apply_user_bulk_action(
        &self,
        action: BulkAction,
        user_ids: &[i32],
    ) -> Result<u64> {
        self.user_repo().apply_bulk(action, user_ids).await
    }

    // ========== Sessions ==========

    pub async fn create_session(
        &self,
        token: &str,
        user_id: i32,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<()> {
        self.session_repo()
            .create(token, user_id, ip_address, user_agent)
            .await
    }

    pub async fn touch_session(&self, token: &str) -> Result<Option<i32>> {
        self.session_repo().touch(token).await
    }

    pub async fn delete_session(&self, token: &str) -> Result<()> {
        self.session_repo().delete(token).await
    }

    pub async fn delete_sessions_for_user(&self, user_id: i32) -> Result<u64> {
        self.session_repo().delete_for_user(user_id).await
    }

    // ========== Events ==========

    pub async fn get_event(&self, id: i32) -> Result<Option<events::Model>> {
        self.event_repo().get(id).await
    }

    pub async fn list_active_events(&self) -> Result<Vec<events::Model>> {
        self.event_repo().list_active().await
    }

    pub async fn list_all_events(&self) -> Result<Vec<events::Model>> {
        self.event_repo().list_all().await
    }

    pub async fn create_event(&self, input: &EventInput) -> Result<i32> {
        self.event_repo().create(input).await
    }

    pub async fn update_event(&self, id: i32, input: &EventInput) -> Result<Option<bool>> {
        self.event_repo().update(id, input).await
    }

    pub async fn delete_event(&self, id: i32) -> Result<bool> {
        self.event_repo().delete(id).await
    }

    pub async fn is_email_registered(&self, event_id: i32, email: &str) -> Result<bool> {
        self.event_repo().is_registered(event_id, email).await
    }

    pub async fn is_user_registered(&self, event_id: i32, user_id: i32) -> Result<bool> {
        self.event_repo()
            .is_user_registered(event_id, user_id)
            .await
    }

    // ========== Registrations (read side; writes go through the
    // reservation service so the seat counter stays consistent) ==========

    pub async fn get_registration(&self, id: i32) -> Result<Option<event_registrations::Model>> {
        self.registration_repo().get(id).await
    }

    pub async fn list_registrations_for_user(&self, user_id: i32) -> Result<Vec<RegistrationRow>> {
        self.registration_repo().list_for_user(user_id).await
    }

    pub async fn list_registrations_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<event_registrations::Model>> {
        self.registration_repo().list_for_event(event_id).await
    }

    // ========== Contact messages ==========

    pub async fn add_contact_message(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<i32> {
        self.contact_repo().add(name, email, subject, message).await
    }

    pub async fn list_contact_messages(
        &self,
        unread_only: bool,
    ) -> Result<Vec<contact_messages::Model>> {
        self.contact_repo().list(unread_only).await
    }

    pub async fn mark_contact_message_read(&self, id: i32) -> Result<bool> {
        self.contact_repo().mark_read(id).await
    }

    // ========== Books ==========

    pub async fn list_books(&self, available_only: bool) -> Result<Vec<books::Model>> {
        self.book_repo().list(available_only).await
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<i32> {
        self.book_repo().create(input).await
    }

    pub async fn update_book(&self, id: i32, input: &BookInput) -> Result<bool> {
        self.book_repo().update(id, input).await
    }

    pub async fn delete_book(&self, id: i32) -> Result<bool> {
        self.book_repo().delete(id).await
    }
}
