//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, like};
use enlapet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter,
};

/// Like repository for database operations.
///
/// Mutations take an explicit connection so the caller can run them inside
/// the same transaction as the counter updates they account for.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and post, on the given connection.
    pub async fn find_by_user_and_post_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a like by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<like::Model>> {
        self.find_by_user_and_post_in(self.db.as_ref(), user_id, post_id)
            .await
    }

    /// Check whether a user has liked a post.
    pub async fn has_liked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_post(user_id, post_id)
            .await?
            .is_some())
    }

    /// Create a new like on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: like::ActiveModel,
    ) -> AppResult<like::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a like on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        like: like::Model,
    ) -> AppResult<()> {
        like.delete(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the likes a user holds on any of the given posts.
    ///
    /// The caller shards `post_ids` at the `IN`-list cap.
    pub async fn find_for_posts(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<like::Model>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.is_in(post_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_post() {
        let like = create_test_like("l1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_user_and_post("user1", "post1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_has_liked_true() {
        let like = create_test_like("l1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert!(repo.has_liked("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_liked_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert!(!repo.has_liked("user1", "post2").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_for_posts() {
        let l1 = create_test_like("l1", "user1", "post1");
        let l2 = create_test_like("l2", "user1", "post3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let post_ids: Vec<String> = ["post1", "post2", "post3"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let result = repo.find_for_posts("user1", &post_ids).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_for_posts_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        let result = repo.find_for_posts("user1", &[]).await.unwrap();

        assert!(result.is_empty());
    }
}
