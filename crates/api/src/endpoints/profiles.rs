//! Profile endpoints: follow graph operations.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use enlapet_common::{AppError, AppResult};
use enlapet_core::{FollowOutcome, UnfollowOutcome};
use enlapet_db::entities::{ProfileKind, follow_edge};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::MessageResponse};

/// Follow/unfollow request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    /// Kind of the target profile ("user" or "pet").
    pub profile_type: Option<String>,
}

/// Follow a profile.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(req): Json<FollowRequest>,
) -> AppResult<Json<MessageResponse>> {
    let kind = req
        .profile_type
        .as_deref()
        .and_then(ProfileKind::parse)
        .ok_or_else(|| AppError::BadRequest("A valid profileType is required".to_string()))?;

    let outcome = state
        .follow_graph_service
        .follow(&user.id, &profile_id, kind)
        .await?;

    let message = match outcome {
        FollowOutcome::Followed => "Now following",
        FollowOutcome::AlreadyFollowing => "Already following",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Unfollow a profile.
///
/// The edge itself records the target kind, so the body's profileType is
/// accepted for contract compatibility but not needed.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(_req): Json<FollowRequest>,
) -> AppResult<Json<MessageResponse>> {
    let outcome = state
        .follow_graph_service
        .unfollow(&user.id, &profile_id)
        .await?;

    let message = match outcome {
        UnfollowOutcome::Unfollowed => "Unfollowed",
        UnfollowOutcome::NotFollowing => "Was not following",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Follow status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

/// Check whether the authenticated user follows a profile.
async fn follow_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> AppResult<Json<FollowStatusResponse>> {
    let is_following = state
        .follow_graph_service
        .follow_status(&user.id, &profile_id)
        .await?;
    Ok(Json(FollowStatusResponse { is_following }))
}

/// Follow edge response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdgeResponse {
    pub follower_id: String,
    pub target_id: String,
    pub target_kind: ProfileKind,
    pub followed_at: String,
}

impl From<follow_edge::Model> for FollowEdgeResponse {
    fn from(edge: follow_edge::Model) -> Self {
        Self {
            follower_id: edge.follower_id,
            target_id: edge.target_id,
            target_kind: edge.target_kind,
            followed_at: edge.created_at.to_rfc3339(),
        }
    }
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

/// Followers listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListResponse {
    pub edges: Vec<FollowEdgeResponse>,
}

/// Get followers of a profile.
async fn followers(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<FollowListResponse>> {
    let limit = query.limit.min(max_limit());
    let edges = state
        .follow_graph_service
        .get_followers(&profile_id, limit, query.until_id.as_deref())
        .await?;

    Ok(Json(FollowListResponse {
        edges: edges.into_iter().map(Into::into).collect(),
    }))
}

/// Get profiles a user is following.
async fn following(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<FollowListResponse>> {
    let limit = query.limit.min(max_limit());
    let edges = state
        .follow_graph_service
        .get_following(&profile_id, limit, query.until_id.as_deref())
        .await?;

    Ok(Json(FollowListResponse {
        edges: edges.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{profile_id}/follow", post(follow))
        .route("/{profile_id}/unfollow", delete(unfollow))
        .route("/{profile_id}/follow-status", get(follow_status))
        .route("/{profile_id}/followers", get(followers))
        .route("/{profile_id}/following", get(following))
}
