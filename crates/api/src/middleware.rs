//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use enlapet_common::config::FeedConfig;
use enlapet_core::{
    EngagementService, FeedService, FollowGraphService, NotificationService, PostService,
};
use enlapet_db::repositories::UserRepository;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub feed_service: FeedService,
    pub follow_graph_service: FollowGraphService,
    pub engagement_service: EngagementService,
    pub post_service: PostService,
    pub notification_service: NotificationService,
    pub feed: FeedConfig,
}

/// Authentication middleware.
///
/// Tokens are issued by the external identity provider; here they are only
/// resolved to the user they belong to.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.users.find_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
