//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "new_follower")]
    NewFollower,
    #[sea_orm(string_value = "new_like")]
    NewLike,
    #[sea_orm(string_value = "new_comment")]
    NewComment,
    #[sea_orm(string_value = "appointment_request")]
    AppointmentRequest,
    #[sea_orm(string_value = "appointment_status")]
    AppointmentStatus,
    #[sea_orm(string_value = "vet_link_request")]
    VetLinkRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// The user who triggered the notification (absent for system events)
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    /// Notification type
    pub notification_type: NotificationType,

    /// Related entity ID (post, profile, appointment)
    #[sea_orm(nullable)]
    pub entity_id: Option<String>,

    /// Related entity type ("post", "profile", "appointment")
    #[sea_orm(nullable)]
    pub entity_type: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
