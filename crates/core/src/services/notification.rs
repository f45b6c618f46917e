//! Notification service.
//!
//! Notifications are a best-effort sink: they are recorded after the primary
//! mutation has committed, and a failure here never affects that outcome.

use enlapet_common::{AppResult, IdGenerator};
use enlapet_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a new-follower notification.
    pub async fn create_follower_notification(
        &self,
        recipient_id: &str,
        actor_id: &str,
        followed_profile_id: &str,
    ) -> AppResult<notification::Model> {
        self.create_internal(
            recipient_id,
            Some(actor_id),
            NotificationType::NewFollower,
            Some(followed_profile_id),
            Some("profile"),
        )
        .await
    }

    /// Record a new-like notification.
    pub async fn create_like_notification(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<notification::Model> {
        self.create_internal(
            recipient_id,
            Some(actor_id),
            NotificationType::NewLike,
            Some(post_id),
            Some("post"),
        )
        .await
    }

    /// Record a new-comment notification.
    pub async fn create_comment_notification(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<notification::Model> {
        self.create_internal(
            recipient_id,
            Some(actor_id),
            NotificationType::NewComment,
            Some(post_id),
            Some("post"),
        )
        .await
    }

    /// Internal helper to create notifications.
    async fn create_internal(
        &self,
        recipient_id: &str,
        actor_id: Option<&str>,
        notification_type: NotificationType,
        entity_id: Option<&str>,
        entity_type: Option<&str>,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.map(std::string::ToString::to_string)),
            notification_type: Set(notification_type),
            entity_id: Set(entity_id.map(std::string::ToString::to_string)),
            entity_type: Set(entity_type.map(std::string::ToString::to_string)),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Get notifications for a user.
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await
    }

    /// Mark a notification as read.
    ///
    /// Silently ignores notifications that do not belong to the user.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        if let Some(n) = notification
            && n.recipient_id == user_id
        {
            self.notification_repo.mark_as_read(notification_id).await?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_notification(id: &str, recipient_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: Some("user2".to_string()),
            notification_type: NotificationType::NewLike,
            entity_id: Some("post1".to_string()),
            entity_type: Some("post".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_notifications() {
        let n1 = create_test_notification("n1", "user1");
        let n2 = create_test_notification("n2", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1, n2]])
                .into_connection(),
        );

        let service = NotificationService::new(NotificationRepository::new(db));
        let result = service
            .get_notifications("user1", 10, None, false)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_as_read_ignores_foreign_notification() {
        // Notification belongs to user2; marking as user1 must be a no-op
        // (no UPDATE issued, so the mock needs no exec results).
        let n = create_test_notification("n1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n]])
                .into_connection(),
        );

        let service = NotificationService::new(NotificationRepository::new(db));
        service.mark_as_read("user1", "n1").await.unwrap();
    }
}
