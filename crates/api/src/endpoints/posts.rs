//! Posts endpoints: creation, likes, saves, comments, batch statuses.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use enlapet_common::AppResult;
use enlapet_core::{CreatePostInput, LikeOutcome, SaveOutcome};
use enlapet_db::entities::{ProfileKind, comment, post};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::MessageResponse};

/// Post response.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub author_type: ProfileKind,
    pub image_url: String,
    pub caption: Option<String>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(post: post::Model) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_type: post.author_type,
            image_url: post.image_url,
            caption: post.caption,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Create a new post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let post = state.post_service.create(&user.id, input).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Get a single post.
async fn get_post(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let post = state.post_service.get(&post_id).await?;
    Ok(Json(post.into()))
}

/// Like a post.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let outcome = state.engagement_service.like_post(&user.id, &post_id).await?;

    let message = match outcome {
        LikeOutcome::Liked => "Post liked",
        _ => "Post already liked",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Unlike a post.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let outcome = state
        .engagement_service
        .unlike_post(&user.id, &post_id)
        .await?;

    let message = match outcome {
        LikeOutcome::Unliked => "Post unliked",
        _ => "Post was not liked",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Save a post.
async fn save(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let outcome = state.engagement_service.save_post(&user.id, &post_id).await?;

    let message = match outcome {
        SaveOutcome::Saved => "Post saved",
        _ => "Post already saved",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Unsave a post.
async fn unsave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let outcome = state
        .engagement_service
        .unsave_post(&user.id, &post_id)
        .await?;

    let message = match outcome {
        SaveOutcome::Unsaved => "Post unsaved",
        _ => "Post was not saved",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Batch status request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusesRequest {
    #[validate(length(min = 1, max = 100, message = "postIds must contain 1 to 100 ids"))]
    pub post_ids: Vec<String>,
}

/// Batch like-status check for the authenticated user.
///
/// Returns the bare `postId -> bool` map.
async fn like_statuses(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StatusesRequest>,
) -> AppResult<Json<HashMap<String, bool>>> {
    req.validate()?;
    let statuses = state
        .engagement_service
        .like_statuses(&user.id, &req.post_ids)
        .await?;
    Ok(Json(statuses))
}

/// Batch save-status check for the authenticated user.
async fn save_statuses(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StatusesRequest>,
) -> AppResult<Json<HashMap<String, bool>>> {
    req.validate()?;
    let statuses = state
        .engagement_service
        .save_statuses(&user.id, &req.post_ids)
        .await?;
    Ok(Json(statuses))
}

/// Comment request.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "text must be 1 to 2000 characters"))]
    pub text: String,
}

/// Comment on a post.
async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    req.validate()?;
    let created = state
        .engagement_service
        .add_comment(&user.id, &post_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Listing parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// Comments listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsResponse {
    pub comments: Vec<CommentResponse>,
}

/// Get comments on a post, newest first.
async fn comments(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<CommentsResponse>> {
    let limit = query.limit.min(max_limit());
    let comments = state
        .engagement_service
        .comments(&post_id, limit, query.until_id.as_deref())
        .await?;

    Ok(Json(CommentsResponse {
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// Saved posts response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostsResponse {
    pub posts: Vec<PostResponse>,
    pub next_cursor: Option<String>,
}

/// Get the posts the authenticated user has saved.
async fn saved(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<SavedPostsResponse>> {
    let limit = query.limit.min(max_limit());
    let page = state
        .engagement_service
        .saved_posts(&user.id, limit, query.until_id.as_deref())
        .await?;

    Ok(Json(SavedPostsResponse {
        posts: page.posts.into_iter().map(Into::into).collect(),
        next_cursor: page.next_until_id,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/saved", get(saved))
        .route("/like-statuses", post(like_statuses))
        .route("/save-statuses", post(save_statuses))
        .route("/{post_id}", get(get_post))
        .route("/{post_id}/like", post(like))
        .route("/{post_id}/unlike", delete(unlike))
        .route("/{post_id}/save", post(save))
        .route("/{post_id}/unsave", delete(unsave))
        .route("/{post_id}/comment", post(comment))
        .route("/{post_id}/comments", get(comments))
}
