//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use enlapet_common::AppResult;
use enlapet_db::entities::notification::{self, NotificationType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::MessageResponse};

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub actor_id: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            actor_id: n.actor_id,
            notification_type: n.notification_type,
            entity_id: n.entity_id,
            entity_type: n.entity_type,
            read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
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
    #[serde(default)]
    pub unread_only: bool,
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// Notifications listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
}

/// Get the authenticated user's notifications, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<NotificationsResponse>> {
    let limit = query.limit.min(max_limit());
    let notifications = state
        .notification_service
        .get_notifications(&user.id, limit, query.until_id.as_deref(), query.unread_only)
        .await?;

    Ok(Json(NotificationsResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state
        .notification_service
        .mark_as_read(&user.id, &notification_id)
        .await?;
    Ok(Json(MessageResponse::new("Notification read")))
}

/// Read-all response.
#[derive(Serialize)]
pub struct ReadAllResponse {
    pub updated: u64,
}

/// Mark all notifications as read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReadAllResponse>> {
    let updated = state.notification_service.mark_all_as_read(&user.id).await?;
    Ok(Json(ReadAllResponse { updated }))
}

/// Unread-count response.
#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Count unread notifications.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/read-all", post(mark_all_read))
        .route("/unread-count", get(unread_count))
        .route("/{notification_id}/read", post(mark_read))
}
