//! Saved post repository.

use std::sync::Arc;

use crate::entities::{SavedPost, saved_post};
use enlapet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Saved post repository for database operations.
#[derive(Clone)]
pub struct SavedPostRepository {
    db: Arc<DatabaseConnection>,
}

impl SavedPostRepository {
    /// Create a new saved post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a save by user and post, on the given connection.
    pub async fn find_by_user_and_post_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<saved_post::Model>> {
        SavedPost::find()
            .filter(saved_post::Column::UserId.eq(user_id))
            .filter(saved_post::Column::PostId.eq(post_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a save by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<saved_post::Model>> {
        self.find_by_user_and_post_in(self.db.as_ref(), user_id, post_id)
            .await
    }

    /// Create a new save on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: saved_post::ActiveModel,
    ) -> AppResult<saved_post::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a save on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        save: saved_post::Model,
    ) -> AppResult<()> {
        save.delete(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the saves a user holds on any of the given posts.
    ///
    /// The caller shards `post_ids` at the `IN`-list cap.
    pub async fn find_for_posts(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<saved_post::Model>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        SavedPost::find()
            .filter(saved_post::Column::UserId.eq(user_id))
            .filter(saved_post::Column::PostId.is_in(post_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's saves, newest first (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<saved_post::Model>> {
        let mut query = SavedPost::find()
            .filter(saved_post::Column::UserId.eq(user_id))
            .order_by_desc(saved_post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(saved_post::Column::Id.lt(id));
        }

        query
            .limit(limit)
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

    fn create_test_save(id: &str, user_id: &str, post_id: &str) -> saved_post::Model {
        saved_post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_post() {
        let save = create_test_save("s1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[save]])
                .into_connection(),
        );

        let repo = SavedPostRepository::new(db);
        let result = repo.find_by_user_and_post("user1", "post1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let s1 = create_test_save("s1", "user1", "post1");
        let s2 = create_test_save("s2", "user1", "post2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = SavedPostRepository::new(db);
        let result = repo.find_by_user("user1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
