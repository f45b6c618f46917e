//! Database entities.

#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod comment;
pub mod follow_edge;
pub mod like;
pub mod notification;
pub mod pet;
pub mod post;
pub mod saved_post;
pub mod user;

pub use comment::Entity as Comment;
pub use follow_edge::Entity as FollowEdge;
pub use like::Entity as Like;
pub use notification::Entity as Notification;
pub use pet::Entity as Pet;
pub use post::Entity as Post;
pub use saved_post::Entity as SavedPost;
pub use user::Entity as User;

/// Profile kinds.
///
/// A profile is either an account (user) or a pet owned by one. Both kinds
/// can author posts and be followed; only users follow.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "pet")]
    Pet,
}

impl ProfileKind {
    /// Parse a client-supplied kind string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "pet" => Some(Self::Pet),
            _ => None,
        }
    }

    /// The wire representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Pet => "pet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_kind_parse() {
        assert_eq!(ProfileKind::parse("user"), Some(ProfileKind::User));
        assert_eq!(ProfileKind::parse("pet"), Some(ProfileKind::Pet));
        assert_eq!(ProfileKind::parse("vet"), None);
    }

    #[test]
    fn test_profile_kind_round_trip() {
        assert_eq!(ProfileKind::parse(ProfileKind::Pet.as_str()), Some(ProfileKind::Pet));
    }
}
