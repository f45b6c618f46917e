//! API integration tests.
//!
//! These tests drive the router end to end against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use chrono::{TimeZone, Utc};
use enlapet_api::{
    middleware::{AppState, auth_middleware},
    router as api_router,
};
use enlapet_common::config::FeedConfig;
use enlapet_core::{
    EngagementService, FeedService, FollowGraphService, NotificationService, PostService,
};
use enlapet_db::entities::{ProfileKind, follow_edge, post, user};
use enlapet_db::repositories::{
    CommentRepository, FollowEdgeRepository, LikeRepository, NotificationRepository,
    PetRepository, PostRepository, SavedPostRepository, UserRepository,
};
use sea_orm::{DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_user(id: &str, username: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        name: Some("Test User".to_string()),
        bio: None,
        profile_picture_url: None,
        token: Some(token.to_string()),
        followers_count: 0,
        following_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_post(id: &str, author_id: &str, ts: i64) -> post::Model {
    post::Model {
        id: id.to_string(),
        author_id: author_id.to_string(),
        author_type: ProfileKind::User,
        image_url: format!("https://cdn.example.com/{id}.jpg"),
        caption: None,
        likes_count: 0,
        comments_count: 0,
        created_at: Utc.timestamp_opt(ts, 0).unwrap().into(),
    }
}

fn test_edge(id: &str, follower_id: &str, target_id: &str) -> follow_edge::Model {
    follow_edge::Model {
        id: id.to_string(),
        follower_id: follower_id.to_string(),
        target_id: target_id.to_string(),
        target_kind: ProfileKind::User,
        created_at: Utc::now().into(),
    }
}

/// Build the app with full middleware stack over a mock connection.
fn test_app(conn: DatabaseConnection) -> Router {
    let db = Arc::new(conn);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let pet_repo = PetRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let follow_repo = FollowEdgeRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let saved_repo = SavedPostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(notification_repo);
    let follow_graph_service = FollowGraphService::new(
        Arc::clone(&db),
        follow_repo.clone(),
        user_repo.clone(),
        pet_repo.clone(),
        notification_service.clone(),
    );
    let engagement_service = EngagementService::new(
        Arc::clone(&db),
        like_repo,
        saved_repo,
        comment_repo,
        post_repo.clone(),
        pet_repo.clone(),
        notification_service.clone(),
    );
    let feed_service = FeedService::new(
        follow_repo,
        post_repo.clone(),
        user_repo.clone(),
        pet_repo.clone(),
    );
    let post_service = PostService::new(post_repo, pet_repo);

    let state = AppState {
        users: user_repo,
        feed_service,
        follow_graph_service,
        engagement_service,
        post_service,
        notification_service,
        feed: FeedConfig::default(),
    };

    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_feed_requires_auth() {
    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/feed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let viewer = test_user("user1", "alice", "token1");

    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[viewer]]) // auth lookup
        .into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/profiles/user1/follow")
                .header(header::AUTHORIZATION, "Bearer token1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"profileType":"user"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Cannot follow yourself")
    );
}

#[tokio::test]
async fn test_follow_requires_profile_type() {
    let viewer = test_user("user1", "alice", "token1");

    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[viewer]]) // auth lookup
        .into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/profiles/user2/follow")
                .header(header::AUTHORIZATION, "Bearer token1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r"{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_missing_post_is_404() {
    let viewer = test_user("user1", "alice", "token1");

    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[viewer]]) // auth lookup
        .append_query_results([Vec::<post::Model>::new()]) // post read in txn
        .into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts/ghost/like")
                .header(header::AUTHORIZATION, "Bearer token1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_status_roundtrip() {
    let viewer = test_user("user1", "alice", "token1");
    let edge = test_edge("e1", "user1", "user2");

    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[viewer]]) // auth lookup
        .append_query_results([[edge]]) // edge lookup
        .into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profiles/user2/follow-status")
                .header(header::AUTHORIZATION, "Bearer token1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isFollowing"], serde_json::json!(true));
}

#[tokio::test]
async fn test_feed_happy_path() {
    let viewer = test_user("user1", "alice", "token1");
    let edges = vec![test_edge("e1", "user1", "a")];
    let personalized = vec![test_post("p1", "a", 10), test_post("p2", "user1", 5)];
    let authors = vec![test_user("a", "anna", "t-a"), test_user("user1", "alice", "token1")];

    let conn = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[viewer]]) // auth lookup
        .append_query_results([edges]) // follow list
        .append_query_results([personalized]) // personalized shard
        .append_query_results([Vec::<post::Model>::new()]) // discovery fill
        .append_query_results([authors]) // author enrichment
        .into_connection();
    let app = test_app(conn);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/feed")
                .header(header::AUTHORIZATION, "Bearer token1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"], "p1");
    assert_eq!(posts[1]["id"], "p2");
    assert_eq!(posts[0]["author"]["name"], "Test User");
    // Short page: end of feed
    assert_eq!(body["nextCursor"], serde_json::Value::Null);
}
