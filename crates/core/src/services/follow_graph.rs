//! Follow graph service.
//!
//! Maintains the directed follow relationship between profiles and the
//! denormalized follower/following counters. Every counter mutation runs in
//! the same transaction as the edge insert or delete it accounts for, so the
//! counts can never drift from the edges under concurrent calls.

use crate::services::notification::NotificationService;
use enlapet_common::{AppError, AppResult, IdGenerator};
use enlapet_db::{
    entities::{ProfileKind, follow_edge},
    repositories::{FollowEdgeRepository, PetRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;

/// Follow graph service for business logic.
#[derive(Clone)]
pub struct FollowGraphService {
    db: Arc<DatabaseConnection>,
    follow_repo: FollowEdgeRepository,
    user_repo: UserRepository,
    pet_repo: PetRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Result of a follow operation.
#[derive(Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The actor is now following the target.
    Followed,
    /// The edge already existed; nothing changed.
    AlreadyFollowing,
}

/// Result of an unfollow operation.
#[derive(Debug, PartialEq, Eq)]
pub enum UnfollowOutcome {
    /// The edge was removed.
    Unfollowed,
    /// No edge existed; nothing changed.
    NotFollowing,
}

impl FollowGraphService {
    /// Create a new follow graph service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        follow_repo: FollowEdgeRepository,
        user_repo: UserRepository,
        pet_repo: PetRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            follow_repo,
            user_repo,
            pet_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a profile.
    ///
    /// Duplicate calls are no-ops: the edge is read inside the transaction
    /// and the counters only move when the edge is actually created.
    pub async fn follow(
        &self,
        actor_id: &str,
        target_id: &str,
        target_kind: ProfileKind,
    ) -> AppResult<FollowOutcome> {
        // Can't follow yourself
        if actor_id == target_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Resolve the target and the notification recipient. A pet's
        // notifications go to its owner.
        let recipient_id = match target_kind {
            ProfileKind::User => {
                self.user_repo
                    .find_by_id_in(&txn, target_id)
                    .await?
                    .ok_or_else(|| AppError::ProfileNotFound(target_id.to_string()))?
                    .id
            }
            ProfileKind::Pet => {
                self.pet_repo
                    .find_by_id_in(&txn, target_id)
                    .await?
                    .ok_or_else(|| AppError::ProfileNotFound(target_id.to_string()))?
                    .owner_id
            }
        };

        if self
            .follow_repo
            .find_by_pair_in(&txn, actor_id, target_id)
            .await?
            .is_some()
        {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let model = follow_edge::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(actor_id.to_string()),
            target_id: Set(target_id.to_string()),
            target_kind: Set(target_kind.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.follow_repo.create_in(&txn, model).await?;

        self.user_repo
            .increment_following_count(&txn, actor_id)
            .await?;
        match target_kind {
            ProfileKind::User => {
                self.user_repo
                    .increment_followers_count(&txn, target_id)
                    .await?;
            }
            ProfileKind::Pet => {
                self.pet_repo
                    .increment_followers_count(&txn, target_id)
                    .await?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Best-effort notification, outside the transaction
        if recipient_id != actor_id {
            let notifications = self.notifications.clone();
            let actor = actor_id.to_string();
            let target = target_id.to_string();
            tokio::spawn(async move {
                if let Err(e) = notifications
                    .create_follower_notification(&recipient_id, &actor, &target)
                    .await
                {
                    tracing::warn!(error = %e, "Failed to record new follower notification");
                }
            });
        }

        Ok(FollowOutcome::Followed)
    }

    /// Unfollow a profile.
    ///
    /// Absent edges are no-ops: the counters are only decremented when an
    /// edge is actually deleted, so they cannot go negative.
    pub async fn unfollow(&self, actor_id: &str, target_id: &str) -> AppResult<UnfollowOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(edge) = self
            .follow_repo
            .find_by_pair_in(&txn, actor_id, target_id)
            .await?
        else {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(UnfollowOutcome::NotFollowing);
        };

        let target_kind = edge.target_kind.clone();
        self.follow_repo.delete_in(&txn, edge).await?;

        self.user_repo
            .decrement_following_count(&txn, actor_id)
            .await?;
        match target_kind {
            ProfileKind::User => {
                self.user_repo
                    .decrement_followers_count(&txn, target_id)
                    .await?;
            }
            ProfileKind::Pet => {
                self.pet_repo
                    .decrement_followers_count(&txn, target_id)
                    .await?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(UnfollowOutcome::Unfollowed)
    }

    /// Check whether a user follows a profile.
    pub async fn follow_status(&self, actor_id: &str, target_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(actor_id, target_id).await
    }

    /// Get followers of a profile.
    pub async fn get_followers(
        &self,
        target_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.follow_repo
            .find_followers(target_id, limit, until_id)
            .await
    }

    /// Get profiles that a user is following.
    pub async fn get_following(
        &self,
        follower_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.follow_repo
            .find_following(follower_id, limit, until_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use enlapet_db::entities::{pet, user};
    use enlapet_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: None,
            bio: None,
            profile_picture_url: None,
            token: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_pet(id: &str, owner_id: &str) -> pet::Model {
        pet::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: "Rex".to_string(),
            species: Some("dog".to_string()),
            breed: None,
            profile_picture_url: None,
            followers_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_edge(id: &str, follower_id: &str, target_id: &str) -> follow_edge::Model {
        follow_edge::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            target_id: target_id.to_string(),
            target_kind: ProfileKind::User,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> FollowGraphService {
        let db = Arc::new(db);
        FollowGraphService::new(
            Arc::clone(&db),
            FollowEdgeRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            PetRepository::new(Arc::clone(&db)),
            NotificationService::new(NotificationRepository::new(db)),
        )
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service.follow("user1", "user1", ProfileKind::User).await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("Cannot follow yourself"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_follow_missing_target_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.follow("user1", "ghost", ProfileKind::User).await;

        match result {
            Err(AppError::ProfileNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected ProfileNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_follow_already_following_is_noop() {
        // Existing edge inside the transaction: no insert, no counter bump.
        let target = create_test_user("user2", "bob");
        let edge = create_test_edge("e1", "user1", "user2");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .append_query_results([[edge]])
            .into_connection();
        let service = service_with(db);

        let result = service
            .follow("user1", "user2", ProfileKind::User)
            .await
            .unwrap();

        assert_eq!(result, FollowOutcome::AlreadyFollowing);
    }

    #[tokio::test]
    async fn test_follow_creates_edge_and_bumps_counters() {
        let target = create_test_user("user2", "bob");
        let inserted = create_test_edge("e1", "user1", "user2");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .append_query_results([Vec::<follow_edge::Model>::new()])
            .append_query_results([[inserted]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db);

        let result = service
            .follow("user1", "user2", ProfileKind::User)
            .await
            .unwrap();

        assert_eq!(result, FollowOutcome::Followed);
    }

    #[tokio::test]
    async fn test_follow_pet_resolves_owner_recipient() {
        let target = create_test_pet("pet1", "user9");
        let inserted = follow_edge::Model {
            target_kind: ProfileKind::Pet,
            ..create_test_edge("e1", "user1", "pet1")
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .append_query_results([Vec::<follow_edge::Model>::new()])
            .append_query_results([[inserted]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db);

        let result = service
            .follow("user1", "pet1", ProfileKind::Pet)
            .await
            .unwrap();

        assert_eq!(result, FollowOutcome::Followed);
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        // No edge: no delete, no decrement, counters stay untouched.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<follow_edge::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.unfollow("user1", "user2").await.unwrap();

        assert_eq!(result, UnfollowOutcome::NotFollowing);
    }

    #[tokio::test]
    async fn test_unfollow_deletes_edge_and_drops_counters() {
        let edge = create_test_edge("e1", "user1", "user2");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[edge]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db);

        let result = service.unfollow("user1", "user2").await.unwrap();

        assert_eq!(result, UnfollowOutcome::Unfollowed);
    }

    #[tokio::test]
    async fn test_follow_status() {
        let edge = create_test_edge("e1", "user1", "user2");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[edge]])
            .into_connection();
        let service = service_with(db);

        assert!(service.follow_status("user1", "user2").await.unwrap());
    }
}
