//! Feed service.
//!
//! Builds the hybrid feed: posts by followed profiles (and the viewer),
//! topped up with globally recent discovery posts when the personalized set
//! cannot fill the page. Two independently-ordered streams are blended, so
//! the page is de-duplicated and re-sorted by timestamp before it is cut.

use std::collections::{HashMap, HashSet};

use enlapet_common::{AppError, AppResult};
use enlapet_db::{
    entities::{ProfileKind, post},
    repositories::{
        FollowEdgeRepository, PetRepository, PostRepository, UserRepository,
        post::sort_newest_first,
    },
};

/// How many extra discovery posts to fetch beyond the shortfall, so
/// de-duplication against the personalized set still fills the page.
const DISCOVERY_OVERFETCH: u64 = 5;

/// Upper bound on the follow list read for feed assembly.
const FOLLOW_LIST_LIMIT: u64 = 10_000;

/// Author projection attached to each feed post.
#[derive(Debug, Clone)]
pub struct AuthorProfile {
    /// Profile id.
    pub id: String,
    /// Profile kind.
    pub kind: ProfileKind,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub profile_picture_url: Option<String>,
}

/// A post enriched with its author projection.
#[derive(Debug, Clone)]
pub struct FeedPost {
    /// The post itself.
    pub post: post::Model,
    /// The resolved author; absent when the author row has vanished.
    pub author: Option<AuthorProfile>,
}

/// One page of the feed.
#[derive(Debug)]
pub struct FeedPage {
    /// Enriched posts, newest first.
    pub posts: Vec<FeedPost>,
    /// Cursor for the next page; `None` signals end-of-feed.
    pub next_cursor: Option<String>,
}

/// Blend a personalized result set with discovery posts into one page.
///
/// Personalized posts have priority for inclusion; discovery posts only fill
/// remaining slots. The final page is always (created_at, id) descending and
/// the cursor is the last post of a full page.
fn blend_page(
    personalized: Vec<post::Model>,
    discovery: Vec<post::Model>,
    page_size: usize,
) -> (Vec<post::Model>, Option<String>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut page: Vec<post::Model> = Vec::with_capacity(page_size);

    for post in personalized {
        if page.len() >= page_size {
            break;
        }
        if seen.insert(post.id.clone()) {
            page.push(post);
        }
    }

    for post in discovery {
        if page.len() >= page_size {
            break;
        }
        if seen.insert(post.id.clone()) {
            page.push(post);
        }
    }

    sort_newest_first(&mut page);

    let next_cursor = if page.len() == page_size {
        page.last().map(|p| p.id.clone())
    } else {
        None
    };

    (page, next_cursor)
}

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    follow_repo: FollowEdgeRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    pet_repo: PetRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowEdgeRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        pet_repo: PetRepository,
    ) -> Self {
        Self {
            follow_repo,
            post_repo,
            user_repo,
            pet_repo,
        }
    }

    /// Get one page of the viewer's feed.
    ///
    /// `cursor` is the id of the last post of the previous page; an unknown
    /// id is rejected. The feed read is not transactional: a follow or post
    /// racing with it lands on a later page at worst.
    pub async fn get_feed(
        &self,
        viewer_id: &str,
        cursor: Option<&str>,
        page_size: u64,
    ) -> AppResult<FeedPage> {
        let cursor_post = match cursor {
            Some(id) => Some(self.post_repo.find_by_id(id).await?.ok_or_else(|| {
                AppError::BadRequest(format!("Unknown feed cursor: {id}"))
            })?),
            None => None,
        };

        // The viewer always sees their own posts in the personalized stream
        let edges = self
            .follow_repo
            .find_following(viewer_id, FOLLOW_LIST_LIMIT, None)
            .await?;
        let mut authors: Vec<String> = edges.into_iter().map(|e| e.target_id).collect();
        authors.push(viewer_id.to_string());

        let personalized = self
            .post_repo
            .find_by_authors(&authors, page_size, cursor_post.as_ref())
            .await?;

        // Discovery fill only when the personalized page is short
        let shortfall = page_size.saturating_sub(personalized.len() as u64);
        let discovery = if shortfall > 0 {
            self.post_repo
                .find_recent(shortfall + DISCOVERY_OVERFETCH, cursor_post.as_ref())
                .await?
        } else {
            Vec::new()
        };

        let (page, next_cursor) = blend_page(
            personalized,
            discovery,
            usize::try_from(page_size).unwrap_or(usize::MAX),
        );

        let posts = self.enrich(page).await?;

        Ok(FeedPage { posts, next_cursor })
    }

    /// Attach author projections to a page of posts.
    ///
    /// Authors are loaded by kind in two batch reads; the stored
    /// `author_type` makes the dispatch direct, with no cross-collection
    /// probing.
    async fn enrich(&self, page: Vec<post::Model>) -> AppResult<Vec<FeedPost>> {
        let mut user_ids: Vec<String> = Vec::new();
        let mut pet_ids: Vec<String> = Vec::new();
        let mut distinct: HashSet<String> = HashSet::new();

        for post in &page {
            if distinct.insert(post.author_id.clone()) {
                match post.author_type {
                    ProfileKind::User => user_ids.push(post.author_id.clone()),
                    ProfileKind::Pet => pet_ids.push(post.author_id.clone()),
                }
            }
        }

        let mut authors: HashMap<String, AuthorProfile> = HashMap::new();

        for user in self.user_repo.find_by_ids(&user_ids).await? {
            authors.insert(
                user.id.clone(),
                AuthorProfile {
                    id: user.id,
                    kind: ProfileKind::User,
                    name: user.name.unwrap_or(user.username),
                    profile_picture_url: user.profile_picture_url,
                },
            );
        }

        for pet in self.pet_repo.find_by_ids(&pet_ids).await? {
            authors.insert(
                pet.id.clone(),
                AuthorProfile {
                    id: pet.id,
                    kind: ProfileKind::Pet,
                    name: pet.name,
                    profile_picture_url: pet.profile_picture_url,
                },
            );
        }

        Ok(page
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned();
                FeedPost { post, author }
            })
            .collect())
    }
}
