use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    /// ISO date, e.g. "2026-09-12"
    pub event_date: String,

    /// 24h time, e.g. "18:30"
    pub event_time: String,

    pub location: String,

    pub price: f64,

    /// Fixed capacity; seats_available counts down from this.
    pub max_participants: i32,

    /// Invariant: 0 <= seats_available <= max_participants.
    pub seats_available: i32,

    /// "active" or "inactive"
    pub status: String,

    pub image_url: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_registrations::Entity")]
    EventRegistrations,
}

impl Related<super::event_registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventRegistrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
