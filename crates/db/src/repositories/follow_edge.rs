//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{FollowEdge, follow_edge};
use enlapet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Follow edge repository for database operations.
///
/// Mutations take an explicit connection so the caller can run them inside
/// the same transaction as the counter updates they account for.
#[derive(Clone)]
pub struct FollowEdgeRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowEdgeRepository {
    /// Create a new follow edge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an edge by follower and target, on the given connection.
    pub async fn find_by_pair_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        follower_id: &str,
        target_id: &str,
    ) -> AppResult<Option<follow_edge::Model>> {
        FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(follower_id))
            .filter(follow_edge::Column::TargetId.eq(target_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an edge by follower and target.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        target_id: &str,
    ) -> AppResult<Option<follow_edge::Model>> {
        self.find_by_pair_in(self.db.as_ref(), follower_id, target_id)
            .await
    }

    /// Check whether a user follows a profile.
    pub async fn is_following(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, target_id).await?.is_some())
    }

    /// Create a new edge on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: follow_edge::ActiveModel,
    ) -> AppResult<follow_edge::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an edge on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        edge: follow_edge::Model,
    ) -> AppResult<()> {
        edge.delete(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get profiles that a user is following (paginated).
    pub async fn find_following(
        &self,
        follower_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(follower_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get followers of a profile (paginated).
    pub async fn find_followers(
        &self,
        target_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::TargetId.eq(target_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
