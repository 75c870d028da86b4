//! Paginated feed assembly over the post store and follow graph.
//!
//! All kinds sort by recency except liked-by-user, which pages the liker's
//! id list in like-insertion order before fetching posts; recency only
//! orders posts within each page there. Anonymous posts surface solely in
//! the unfiltered global feed, with the author redacted; every author- or
//! network-scoped kind excludes them.

use crate::database::repositories::{
    FollowRepository, LikeRepository, PostRepository, UserRepository,
};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::posts::{build_post_view, PostCategory, PostView};
use serde::Serialize;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 15;

/// Invalid or missing pagination parameters fall back to the defaults
/// instead of failing.
pub fn normalize_pagination(page: Option<i64>, limit: Option<i64>) -> (usize, usize) {
    let page = match page {
        Some(p) if p >= 1 => p as usize,
        _ => DEFAULT_PAGE,
    };
    let limit = match limit {
        Some(l) if l >= 1 => l as usize,
        _ => DEFAULT_LIMIT,
    };
    (page, limit)
}

#[derive(Debug, Clone)]
pub enum FeedKind {
    All,
    Following { user_id: String },
    Category { category: PostCategory },
    Author { username: String },
    LikedBy { user_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    /// Total matching items across all pages, so callers can tell whether
    /// more pages exist.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Clone)]
pub struct FeedService {
    database: Database,
}

impl FeedService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn assemble(&self, kind: FeedKind, page: usize, limit: usize) -> ServiceResult<FeedPage> {
        let offset = (page - 1) * limit;

        let assembled = self.database.with_repositories(|repos| {
            let posts_repo = repos.posts();
            let (records, total) = match &kind {
                FeedKind::All => {
                    let records = posts_repo.page_all(limit, offset)?;
                    let total = posts_repo.count_all()?;
                    (records, total)
                }
                FeedKind::Following { user_id } => {
                    if repos.users().get(user_id)?.is_none() {
                        return Ok(None);
                    }
                    let following = repos.follows().following_of(user_id)?;
                    let records = posts_repo.page_public_by_authors(&following, limit, offset)?;
                    let total = posts_repo.count_public_by_authors(&following)?;
                    (records, total)
                }
                FeedKind::Category { category } => {
                    let records =
                        posts_repo.page_public_by_category(category.as_str(), limit, offset)?;
                    let total = posts_repo.count_public_by_category(category.as_str())?;
                    (records, total)
                }
                FeedKind::Author { username } => {
                    let Some(author) = repos.users().get_by_username(username)? else {
                        return Ok(None);
                    };
                    let ids = vec![author.id];
                    let records = posts_repo.page_public_by_authors(&ids, limit, offset)?;
                    let total = posts_repo.count_public_by_authors(&ids)?;
                    (records, total)
                }
                FeedKind::LikedBy { user_id } => {
                    if repos.users().get(user_id)?.is_none() {
                        return Ok(None);
                    }
                    // Page the liked-id list first: ordering across pages is
                    // like-insertion order, not post recency.
                    let liked = repos.likes().liked_post_ids(user_id)?;
                    let total = liked.len();
                    let page_ids: Vec<String> = liked
                        .into_iter()
                        .skip(offset)
                        .take(limit)
                        .collect();
                    let records = posts_repo.get_many(&page_ids)?;
                    (records, total)
                }
            };

            let mut views = Vec::with_capacity(records.len());
            for record in records {
                views.push(build_post_view(&repos, record)?);
            }
            Ok(Some((views, total)))
        })?;

        let (posts, total) = assembled.ok_or_else(|| ServiceError::not_found("user not found"))?;
        Ok(FeedPage {
            posts,
            total,
            page,
            limit,
        })
    }
}
