//! API endpoints.

mod feed;
mod notifications;
mod posts;
mod profiles;

use axum::Router;

use crate::middleware::AppState;

pub use posts::PostResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/feed", feed::router())
        .nest("/posts", posts::router())
        .nest("/profiles", profiles::router())
        .nest("/notifications", notifications::router())
}
