//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use crate::repositories::shard_ids;
use enlapet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Condition selecting posts strictly older than the cursor position.
///
/// Ordering is (created_at, id) descending everywhere, so a timestamp
/// collision never repeats or skips a row across pages.
fn older_than(cursor: &post::Model) -> Condition {
    Condition::any()
        .add(post::Column::CreatedAt.lt(cursor.created_at))
        .add(
            Condition::all()
                .add(post::Column::CreatedAt.eq(cursor.created_at))
                .add(post::Column::Id.lt(cursor.id.clone())),
        )
}

/// Sort newest-first by (created_at, id).
pub fn sort_newest_first(posts: &mut [post::Model]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID, on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find a post by ID on the given connection, erroring if absent.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<post::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs, sharding oversized `IN` filters.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut posts = Vec::with_capacity(ids.len());
        for shard in shard_ids(ids) {
            let batch = Post::find()
                .filter(post::Column::Id.is_in(shard.to_vec()))
                .all(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            posts.extend(batch);
        }
        Ok(posts)
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get posts authored by any of the given profiles, newest first.
    ///
    /// The author filter is sharded at the `IN`-list cap; each shard is
    /// queried with the same ordering and limit, then the batches are merged,
    /// re-sorted and truncated, so a large follow list loses no posts.
    pub async fn find_by_authors(
        &self,
        author_ids: &[String],
        limit: u64,
        until: Option<&post::Model>,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut posts: Vec<post::Model> = Vec::new();
        for shard in shard_ids(author_ids) {
            let mut condition =
                Condition::all().add(post::Column::AuthorId.is_in(shard.to_vec()));
            if let Some(cursor) = until {
                condition = condition.add(older_than(cursor));
            }

            let batch = Post::find()
                .filter(condition)
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id)
                .limit(limit)
                .all(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            posts.extend(batch);
        }

        sort_newest_first(&mut posts);
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(posts)
    }

    /// Get globally recent posts, newest first (discovery source).
    pub async fn find_recent(
        &self,
        limit: u64,
        until: Option<&post::Model>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);

        if let Some(cursor) = until {
            query = query.filter(older_than(cursor));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment likes count atomically (single UPDATE query, no fetch).
    pub async fn increment_likes_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::col(post::Column::LikesCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement likes count atomically, clamped at zero.
    pub async fn decrement_likes_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment comments count atomically (single UPDATE query, no fetch).
    pub async fn increment_comments_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
