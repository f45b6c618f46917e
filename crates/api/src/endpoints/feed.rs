//! Feed endpoints.

use axum::{Json, Router, extract::Query, extract::State, routing::get};
use enlapet_common::AppResult;
use enlapet_core::{AuthorProfile, FeedPost};
use enlapet_db::entities::ProfileKind;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, endpoints::posts::PostResponse};

/// Feed request parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Id of the last post of the previous page.
    pub cursor: Option<String>,
    /// Requested page size.
    pub limit: Option<u64>,
}

/// Author projection response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ProfileKind,
    pub name: String,
    pub profile_picture_url: Option<String>,
}

impl From<AuthorProfile> for AuthorResponse {
    fn from(author: AuthorProfile) -> Self {
        Self {
            id: author.id,
            kind: author.kind,
            name: author.name,
            profile_picture_url: author.profile_picture_url,
        }
    }
}

/// One feed entry: a post plus its author projection.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub author: Option<AuthorResponse>,
}

impl From<FeedPost> for FeedPostResponse {
    fn from(item: FeedPost) -> Self {
        Self {
            post: item.post.into(),
            author: item.author.map(Into::into),
        }
    }
}

/// Feed response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub posts: Vec<FeedPostResponse>,
    pub next_cursor: Option<String>,
}

/// Get one page of the viewer's feed.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let limit = query
        .limit
        .unwrap_or(state.feed.default_page_size)
        .clamp(1, state.feed.max_page_size);

    let page = state
        .feed_service
        .get_feed(&user.id, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(FeedResponse {
        posts: page.posts.into_iter().map(Into::into).collect(),
        next_cursor: page.next_cursor,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
