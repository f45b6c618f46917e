//! Business logic services.

#![allow(missing_docs)]

pub mod engagement;
pub mod feed;
pub mod follow_graph;
pub mod notification;
pub mod post;

pub use engagement::{EngagementService, LikeOutcome, SaveOutcome};
pub use feed::{AuthorProfile, FeedPage, FeedPost, FeedService};
pub use follow_graph::{FollowGraphService, FollowOutcome, UnfollowOutcome};
pub use notification::NotificationService;
pub use post::{CreatePostInput, PostService};
