//! Engagement service.
//!
//! Likes, saves and comments. Relation rows are the sole source of truth for
//! whether a counter moved: each toggle reads the relation inside the same
//! transaction that writes it and its counter, which makes repeated calls
//! no-ops instead of double counts.

use std::collections::HashMap;
use std::sync::Arc;

use crate::services::notification::NotificationService;
use enlapet_common::{AppError, AppResult, IdGenerator};
use enlapet_db::{
    entities::{ProfileKind, comment, like, post, saved_post},
    repositories::{
        CommentRepository, LikeRepository, PetRepository, PostRepository, SavedPostRepository,
        shard_ids,
    },
};
use futures::stream::{self, StreamExt, TryStreamExt};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

/// Concurrent status-shard queries in flight at once.
const STATUS_CONCURRENCY: usize = 4;

/// Result of a like or unlike toggle.
#[derive(Debug, PartialEq, Eq)]
pub enum LikeOutcome {
    /// A like was recorded and the counter incremented.
    Liked,
    /// The like already existed; nothing changed.
    AlreadyLiked,
    /// The like was removed and the counter decremented.
    Unliked,
    /// No like existed; nothing changed.
    NotLiked,
}

/// Result of a save or unsave toggle.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A save was recorded.
    Saved,
    /// The save already existed; nothing changed.
    AlreadySaved,
    /// The save was removed.
    Unsaved,
    /// No save existed; nothing changed.
    NotSaved,
}

/// A page of saved posts plus the cursor for the next page.
#[derive(Debug)]
pub struct SavedPostsPage {
    /// Saved posts, most recently saved first.
    pub posts: Vec<post::Model>,
    /// Save-row id to pass as `until_id` for the next page.
    pub next_until_id: Option<String>,
}

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    db: Arc<DatabaseConnection>,
    like_repo: LikeRepository,
    saved_repo: SavedPostRepository,
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    pet_repo: PetRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        like_repo: LikeRepository,
        saved_repo: SavedPostRepository,
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        pet_repo: PetRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            like_repo,
            saved_repo,
            comment_repo,
            post_repo,
            pet_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post.
    ///
    /// At most one increment is ever applied per (user, post) pair, however
    /// many times this is called.
    pub async fn like_post(&self, actor_id: &str, post_id: &str) -> AppResult<LikeOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = self.post_repo.get_by_id_in(&txn, post_id).await?;

        if self
            .like_repo
            .find_by_user_and_post_in(&txn, actor_id, post_id)
            .await?
            .is_some()
        {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.like_repo.create_in(&txn, model).await?;
        self.post_repo.increment_likes_count(&txn, post_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.notify_engagement(&post, actor_id, EngagementKind::Like);

        Ok(LikeOutcome::Liked)
    }

    /// Unlike a post.
    ///
    /// Absent likes are no-ops: the counter is only decremented when a like
    /// row is actually deleted.
    pub async fn unlike_post(&self, actor_id: &str, post_id: &str) -> AppResult<LikeOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(existing) = self
            .like_repo
            .find_by_user_and_post_in(&txn, actor_id, post_id)
            .await?
        else {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(LikeOutcome::NotLiked);
        };

        self.like_repo.delete_in(&txn, existing).await?;
        self.post_repo.decrement_likes_count(&txn, post_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(LikeOutcome::Unliked)
    }

    /// Save a post. Saves keep no counter; the row alone is the state.
    pub async fn save_post(&self, actor_id: &str, post_id: &str) -> AppResult<SaveOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.post_repo.get_by_id_in(&txn, post_id).await?;

        if self
            .saved_repo
            .find_by_user_and_post_in(&txn, actor_id, post_id)
            .await?
            .is_some()
        {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(SaveOutcome::AlreadySaved);
        }

        let model = saved_post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.saved_repo.create_in(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(SaveOutcome::Saved)
    }

    /// Unsave a post.
    pub async fn unsave_post(&self, actor_id: &str, post_id: &str) -> AppResult<SaveOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(existing) = self
            .saved_repo
            .find_by_user_and_post_in(&txn, actor_id, post_id)
            .await?
        else {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(SaveOutcome::NotSaved);
        };

        self.saved_repo.delete_in(&txn, existing).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(SaveOutcome::Unsaved)
    }

    /// Batch like-status check: `post_id -> liked?` for every requested id.
    ///
    /// Id shards run with bounded concurrency and merge into one map; ids
    /// with no like row come back `false`.
    pub async fn like_statuses(
        &self,
        actor_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashMap<String, bool>> {
        let mut statuses: HashMap<String, bool> =
            post_ids.iter().map(|id| (id.clone(), false)).collect();

        let shards: Vec<Vec<String>> = shard_ids(post_ids).map(<[String]>::to_vec).collect();
        let shard_queries = shards.into_iter().map(|shard| {
            let repo = self.like_repo.clone();
            let actor = actor_id.to_string();
            async move { repo.find_for_posts(&actor, &shard).await }
        });

        let results: Vec<Vec<like::Model>> = stream::iter(shard_queries)
            .buffer_unordered(STATUS_CONCURRENCY)
            .try_collect()
            .await?;

        for likes in results {
            for l in likes {
                statuses.insert(l.post_id, true);
            }
        }

        Ok(statuses)
    }

    /// Batch save-status check: `post_id -> saved?` for every requested id.
    pub async fn save_statuses(
        &self,
        actor_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashMap<String, bool>> {
        let mut statuses: HashMap<String, bool> =
            post_ids.iter().map(|id| (id.clone(), false)).collect();

        let shards: Vec<Vec<String>> = shard_ids(post_ids).map(<[String]>::to_vec).collect();
        let shard_queries = shards.into_iter().map(|shard| {
            let repo = self.saved_repo.clone();
            let actor = actor_id.to_string();
            async move { repo.find_for_posts(&actor, &shard).await }
        });

        let results: Vec<Vec<saved_post::Model>> = stream::iter(shard_queries)
            .buffer_unordered(STATUS_CONCURRENCY)
            .try_collect()
            .await?;

        for saves in results {
            for s in saves {
                statuses.insert(s.post_id, true);
            }
        }

        Ok(statuses)
    }

    /// Add a comment to a post.
    pub async fn add_comment(
        &self,
        actor_id: &str,
        post_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Comment text is required".to_string()));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = self.post_repo.get_by_id_in(&txn, post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(actor_id.to_string()),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.comment_repo.create_in(&txn, model).await?;
        self.post_repo
            .increment_comments_count(&txn, post_id)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.notify_engagement(&post, actor_id, EngagementKind::Comment);

        Ok(created)
    }

    /// Get comments on a post, newest first.
    pub async fn comments(
        &self,
        post_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_post(post_id, limit, until_id).await
    }

    /// Get the posts a user has saved, most recently saved first.
    pub async fn saved_posts(
        &self,
        actor_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<SavedPostsPage> {
        let saves = self
            .saved_repo
            .find_by_user(actor_id, limit, until_id)
            .await?;

        let next_until_id = if saves.len() as u64 == limit {
            saves.last().map(|s| s.id.clone())
        } else {
            None
        };

        let ids: Vec<String> = saves.iter().map(|s| s.post_id.clone()).collect();
        let posts = self.post_repo.find_by_ids(&ids).await?;
        let by_id: HashMap<String, post::Model> =
            posts.into_iter().map(|p| (p.id.clone(), p)).collect();

        // Preserve save order; drop saves whose post has since vanished
        let ordered = saves
            .iter()
            .filter_map(|s| by_id.get(&s.post_id).cloned())
            .collect();

        Ok(SavedPostsPage {
            posts: ordered,
            next_until_id,
        })
    }

    /// Spawn a best-effort engagement notification to the post author,
    /// outside the committed transaction. Pet-authored posts notify the
    /// pet's owner; self-engagement is skipped.
    fn notify_engagement(&self, post: &post::Model, actor_id: &str, kind: EngagementKind) {
        let notifications = self.notifications.clone();
        let pet_repo = self.pet_repo.clone();
        let author_id = post.author_id.clone();
        let author_type = post.author_type.clone();
        let post_id = post.id.clone();
        let actor = actor_id.to_string();

        tokio::spawn(async move {
            let recipient = match author_type {
                ProfileKind::User => Some(author_id),
                ProfileKind::Pet => match pet_repo.find_by_id(&author_id).await {
                    Ok(pet) => pet.map(|p| p.owner_id),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to resolve post author's owner");
                        None
                    }
                },
            };

            let Some(recipient) = recipient else { return };
            if recipient == actor {
                return;
            }

            let result = match kind {
                EngagementKind::Like => {
                    notifications
                        .create_like_notification(&recipient, &actor, &post_id)
                        .await
                }
                EngagementKind::Comment => {
                    notifications
                        .create_comment_notification(&recipient, &actor, &post_id)
                        .await
                }
            };

            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to record engagement notification");
            }
        });
    }
}

enum EngagementKind {
    Like,
    Comment,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use enlapet_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            author_type: ProfileKind::User,
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            caption: Some("A very good dog".to_string()),
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> EngagementService {
        let db = Arc::new(db);
        EngagementService::new(
            Arc::clone(&db),
            LikeRepository::new(Arc::clone(&db)),
            SavedPostRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            PetRepository::new(Arc::clone(&db)),
            NotificationService::new(NotificationRepository::new(db)),
        )
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.like_post("user1", "ghost").await;

        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_double_like_is_noop() {
        // The second call sees the existing relation inside the transaction
        // and must not touch the counter.
        let post = create_test_post("post1", "author1");
        let existing = create_test_like("l1", "user1", "post1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post]])
            .append_query_results([[existing]])
            .into_connection();
        let service = service_with(db);

        let result = service.like_post("user1", "post1").await.unwrap();

        assert_eq!(result, LikeOutcome::AlreadyLiked);
    }

    #[tokio::test]
    async fn test_like_creates_relation_and_increments() {
        let post = create_test_post("post1", "author1");
        let inserted = create_test_like("l1", "user1", "post1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post]])
            .append_query_results([Vec::<like::Model>::new()])
            .append_query_results([[inserted]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = service_with(db);

        let result = service.like_post("user1", "post1").await.unwrap();

        assert_eq!(result, LikeOutcome::Liked);
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<like::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.unlike_post("user1", "post1").await.unwrap();

        assert_eq!(result, LikeOutcome::NotLiked);
    }

    #[tokio::test]
    async fn test_unlike_deletes_relation_and_decrements() {
        let existing = create_test_like("l1", "user1", "post1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
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

        let result = service.unlike_post("user1", "post1").await.unwrap();

        assert_eq!(result, LikeOutcome::Unliked);
    }

    #[tokio::test]
    async fn test_add_comment_rejects_empty_text() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service.add_comment("user1", "post1", "   ").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("required")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_like_statuses_defaults_to_false() {
        // One shard query returning a single like; the other id stays false.
        let l1 = create_test_like("l1", "user1", "post1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[l1]])
            .into_connection();
        let service = service_with(db);

        let post_ids: Vec<String> = ["post1", "post2"].iter().map(ToString::to_string).collect();
        let statuses = service.like_statuses("user1", &post_ids).await.unwrap();

        assert_eq!(statuses.get("post1"), Some(&true));
        assert_eq!(statuses.get("post2"), Some(&false));
    }

    #[tokio::test]
    async fn test_like_statuses_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let statuses = service.like_statuses("user1", &[]).await.unwrap();

        assert!(statuses.is_empty());
    }
}
