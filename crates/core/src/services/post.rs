//! Post service.
//!
//! Thin creation/read path for posts. The author kind is stamped on every
//! post at write time, which is what lets the feed enrich authors without
//! probing both profile tables.

use enlapet_common::{AppError, AppResult, IdGenerator};
use enlapet_db::{
    entities::{ProfileKind, post},
    repositories::{PetRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// Input for creating a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    /// Image URL in object storage (uploads are handled elsewhere).
    pub image_url: String,
    /// Optional caption.
    #[serde(default)]
    pub caption: Option<String>,
    /// Post as one of the author's pets instead of the user profile.
    #[serde(default)]
    pub posted_as_pet: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    pet_repo: PetRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, pet_repo: PetRepository) -> Self {
        Self {
            post_repo,
            pet_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post authored by the user, or by one of their pets.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        if input.image_url.trim().is_empty() {
            return Err(AppError::BadRequest("Image URL is required".to_string()));
        }

        let (author_id, author_type) = match input.posted_as_pet {
            Some(ref pet_id) => {
                let pet = self.pet_repo.get_by_id(pet_id).await?;
                if pet.owner_id != author_id {
                    return Err(AppError::Forbidden(
                        "Cannot post as a pet you do not own".to_string(),
                    ));
                }
                (pet.id, ProfileKind::Pet)
            }
            None => (author_id.to_string(), ProfileKind::User),
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id),
            author_type: Set(author_type),
            image_url: Set(input.image_url),
            caption: Set(input.caption),
            likes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.post_repo.create(model).await
    }

    /// Get a post by id.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }
}
