//! Pet repository.

use std::sync::Arc;

use crate::entities::{Pet, pet};
use crate::repositories::shard_ids;
use enlapet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::Expr,
};

/// Pet repository for database operations.
#[derive(Clone)]
pub struct PetRepository {
    db: Arc<DatabaseConnection>,
}

impl PetRepository {
    /// Create a new pet repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a pet by ID, on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<pet::Model>> {
        Pet::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pet by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<pet::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a pet by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<pet::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
    }

    /// Find pets by IDs, sharding oversized `IN` filters.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<pet::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut pets = Vec::with_capacity(ids.len());
        for shard in shard_ids(ids) {
            let batch = Pet::find()
                .filter(pet::Column::Id.is_in(shard.to_vec()))
                .all(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            pets.extend(batch);
        }
        Ok(pets)
    }

    /// Get the pets owned by a user.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<pet::Model>> {
        Pet::find()
            .filter(pet::Column::OwnerId.eq(owner_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new pet.
    pub async fn create(&self, model: pet::ActiveModel) -> AppResult<pet::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment followers count atomically (single UPDATE query, no fetch).
    pub async fn increment_followers_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        pet_id: &str,
    ) -> AppResult<()> {
        Pet::update_many()
            .col_expr(
                pet::Column::FollowersCount,
                Expr::col(pet::Column::FollowersCount).add(1),
            )
            .filter(pet::Column::Id.eq(pet_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement followers count atomically, clamped at zero.
    pub async fn decrement_followers_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        pet_id: &str,
    ) -> AppResult<()> {
        Pet::update_many()
            .col_expr(
                pet::Column::FollowersCount,
                Expr::cust("GREATEST(followers_count - 1, 0)"),
            )
            .filter(pet::Column::Id.eq(pet_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_pet(id: &str, owner_id: &str, name: &str) -> pet::Model {
        pet::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            species: Some("dog".to_string()),
            breed: None,
            profile_picture_url: None,
            followers_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let pet = create_test_pet("p1", "u1", "Rex");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pet]])
                .into_connection(),
        );

        let repo = PetRepository::new(db);
        let result = repo.find_by_id("p1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Rex");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<pet::Model>::new()])
                .into_connection(),
        );

        let repo = PetRepository::new(db);
        let result = repo.get_by_id("missing").await;

        match result {
            Err(AppError::ProfileNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected ProfileNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let p1 = create_test_pet("p1", "u1", "Rex");
        let p2 = create_test_pet("p2", "u1", "Mia");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PetRepository::new(db);
        let result = repo.find_by_owner("u1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
