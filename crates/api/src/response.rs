//! API response types.

use serde::Serialize;

/// Plain `{message}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Build a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let body = serde_json::to_value(MessageResponse::new("Post liked")).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Post liked"}));
    }
}
