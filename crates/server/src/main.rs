//! EnlaPet server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use enlapet_api::{
    middleware::{AppState, auth_middleware},
    router as api_router,
};
use enlapet_common::Config;
use enlapet_core::{
    EngagementService, FeedService, FollowGraphService, NotificationService, PostService,
};
use enlapet_db::repositories::{
    CommentRepository, FollowEdgeRepository, LikeRepository, NotificationRepository,
    PetRepository, PostRepository, SavedPostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enlapet=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting EnlaPet server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = enlapet_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    enlapet_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let pet_repo = PetRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let follow_repo = FollowEdgeRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let saved_repo = SavedPostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Initialize services
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
        feed: config.feed.clone(),
    };

    // Build the router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router = api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Serve
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
