//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::ProfileKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author profile ID (user or pet)
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Author profile kind, stamped at write time so readers never probe
    pub author_type: ProfileKind,

    /// Image URL in object storage
    pub image_url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub caption: Option<String>,

    /// Likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    /// Comments count (denormalized)
    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    #[sea_orm(indexed)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::like::Entity")]
    Likes,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
