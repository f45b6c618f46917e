//! Pet entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user this pet belongs to
    #[sea_orm(indexed)]
    pub owner_id: String,

    pub name: String,

    #[sea_orm(nullable)]
    pub species: Option<String>,

    #[sea_orm(nullable)]
    pub breed: Option<String>,

    /// Profile picture URL
    #[sea_orm(nullable)]
    pub profile_picture_url: Option<String>,

    /// Followers count (denormalized; pets never follow)
    #[sea_orm(default_value = 0)]
    pub followers_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
