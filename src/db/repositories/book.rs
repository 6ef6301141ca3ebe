use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{books, prelude::*};

#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub cover_image: Option<String>,
    pub available: bool,
}

pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, available_only: bool) -> Result<Vec<books::Model>> {
        let mut query = Books::find();
        if available_only {
            query = query.filter(books::Column::Available.eq(true));
        }

        query
            .order_by_asc(books::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list books")
    }

    pub async fn create(&self, input: &BookInput) -> Result<i32> {
        let active = books::ActiveModel {
            title: Set(input.title.clone()),
            author: Set(input.author.clone()),
            genre: Set(input.genre.clone()),
            description: Set(input.description.clone()),
            price: Set(input.price),
            cover_image: Set(input.cover_image.clone()),
            available: Set(input.available),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert book")?;

        Ok(model.id)
    }

    pub async fn update(&self, id: i32, input: &BookInput) -> Result<bool> {
        let Some(book) = Books::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: books::ActiveModel = book.into();
        active.title = Set(input.title.clone());
        active.author = Set(input.author.clone());
        active.genre = Set(input.genre.clone());
        active.description = Set(input.description.clone());
        active.price = Set(input.price);
        active.cover_image = Set(input.cover_image.clone());
        active.available = Set(input.available);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Books::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete book")?;

        Ok(result.rows_affected > 0)
    }
}
