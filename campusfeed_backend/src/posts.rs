//! Post lifecycle: creation (moderation-gated for anonymous submissions),
//! owner-only deletion, institution-scoped comments and likes.

use crate::database::models::{CommentRecord, PostRecord};
use crate::database::repositories::{
    CommentRepository, LikeRepository, PostRepository, SqliteRepositories, UserRepository,
};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::moderation::ModerationPipeline;
use crate::notifications::{self, NotificationKind};
use crate::oracles::AssetStore;
use crate::users::UserSummary;
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostCategory {
    Announcement,
    Department,
    Events,
    Other,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Announcement => "Announcement",
            PostCategory::Department => "Department",
            PostCategory::Events => "Events",
            PostCategory::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Announcement" => Some(PostCategory::Announcement),
            "Department" => Some(PostCategory::Department),
            "Events" => Some(PostCategory::Events),
            "Other" => Some(PostCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub author: Option<UserSummary>,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    /// Redacted for anonymous posts; the record keeps the true author.
    pub author: Option<UserSummary>,
    pub body: String,
    pub image_url: Option<String>,
    pub category: String,
    pub university: String,
    pub anonymous: bool,
    pub like_count: usize,
    pub comments: Vec<CommentView>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub body: String,
    pub category: PostCategory,
    #[serde(default)]
    pub anonymous: bool,
    /// Local path of an already-received upload; the asset store turns it
    /// into a public URL or the post ships without an image.
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

/// Builds the display view for a post within an open repository scope.
/// Anonymous posts come back with the author redacted.
pub(crate) fn build_post_view(
    repos: &SqliteRepositories<'_>,
    record: PostRecord,
) -> anyhow::Result<PostView> {
    let author = if record.anonymous {
        None
    } else {
        repos
            .users()
            .get(&record.author_id)?
            .map(UserSummary::from_record)
    };
    let like_count = repos.likes().count_for_post(&record.id)?;
    let comment_records = repos.comments().list_for_post(&record.id)?;
    let mut comments = Vec::with_capacity(comment_records.len());
    for comment in comment_records {
        let comment_author = repos
            .users()
            .get(&comment.author_id)?
            .map(UserSummary::from_record);
        comments.push(CommentView {
            id: comment.id,
            author: comment_author,
            body: comment.body,
            created_at: comment.created_at,
        });
    }
    Ok(PostView {
        id: record.id,
        author,
        body: record.body,
        image_url: record.image_url,
        category: record.category,
        university: record.university,
        anonymous: record.anonymous,
        like_count,
        comments,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

#[derive(Clone)]
pub struct PostService {
    database: Database,
    moderation: ModerationPipeline,
    assets: Arc<dyn AssetStore>,
}

impl PostService {
    pub fn new(
        database: Database,
        moderation: ModerationPipeline,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            database,
            moderation,
            assets,
        }
    }

    /// Creates a post for the author. Anonymous submissions pass through the
    /// moderation pipeline first; a rejection persists nothing. Image upload
    /// failure degrades to a post without an image.
    pub async fn create_post(
        &self,
        author_id: &str,
        input: CreatePostInput,
    ) -> ServiceResult<PostView> {
        if input.body.trim().is_empty() {
            return Err(ServiceError::validation("post text is required"));
        }

        if input.anonymous {
            let verdict = self.moderation.moderate(&input.body).await?;
            tracing::debug!(
                positive = verdict.label_was_positive,
                "anonymous submission cleared moderation"
            );
        }

        let image_url = match &input.image_path {
            Some(path) => match self.assets.store(path).await {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(error = %err, "asset upload failed, posting without image");
                    None
                }
            },
            None => None,
        };

        let view = self.database.with_repositories(|repos| {
            let Some(author) = repos.users().get(author_id)? else {
                return Ok(None);
            };
            let record = PostRecord {
                id: Uuid::new_v4().to_string(),
                author_id: author.id.clone(),
                body: input.body.clone(),
                image_url: image_url.clone(),
                category: input.category.as_str().to_string(),
                // Stamped once from the author's current institution.
                university: author.university.clone(),
                anonymous: input.anonymous,
                created_at: now_utc_iso(),
                updated_at: None,
            };
            repos.posts().create(&record)?;
            Ok(Some(build_post_view(&repos, record)?))
        })?;

        view.ok_or_else(|| ServiceError::not_found("user not found"))
    }

    pub fn delete_post(&self, post_id: &str, requester_id: &str) -> ServiceResult<()> {
        enum Outcome {
            Deleted,
            Missing,
            NotOwner,
        }

        let outcome = self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(Outcome::Missing);
            };
            if post.author_id != requester_id {
                return Ok(Outcome::NotOwner);
            }
            repos.posts().delete(post_id)?;
            Ok(Outcome::Deleted)
        })?;

        match outcome {
            Outcome::Deleted => Ok(()),
            Outcome::Missing => Err(ServiceError::not_found("post not found")),
            Outcome::NotOwner => Err(ServiceError::forbidden(
                "you are not authorized to delete this post",
            )),
        }
    }

    /// Appends a comment. The commenter's institution must match the post's
    /// stamped institution tag.
    pub fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        text: &str,
    ) -> ServiceResult<CommentView> {
        if text.trim().is_empty() {
            return Err(ServiceError::validation("comment text is required"));
        }

        enum Outcome {
            Added(CommentView),
            PostMissing,
            UserMissing,
            WrongInstitution,
        }

        let outcome = self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(Outcome::PostMissing);
            };
            let Some(user) = repos.users().get(author_id)? else {
                return Ok(Outcome::UserMissing);
            };
            if user.university != post.university {
                return Ok(Outcome::WrongInstitution);
            }
            let record = CommentRecord {
                id: Uuid::new_v4().to_string(),
                post_id: post.id.clone(),
                author_id: user.id.clone(),
                body: text.to_string(),
                created_at: now_utc_iso(),
            };
            repos.comments().add(&record)?;
            Ok(Outcome::Added(CommentView {
                id: record.id,
                author: Some(UserSummary::from_record(user)),
                body: record.body,
                created_at: record.created_at,
            }))
        })?;

        match outcome {
            Outcome::Added(view) => Ok(view),
            Outcome::PostMissing => Err(ServiceError::not_found("post not found")),
            Outcome::UserMissing => Err(ServiceError::not_found("user not found")),
            Outcome::WrongInstitution => Err(ServiceError::forbidden(
                "you are not authorized to comment on this post",
            )),
        }
    }

    /// Adds or removes the user's like. The liker's institution is checked
    /// against the author's current record, not the post's stamped tag; the
    /// comment path trusts the stamp instead. The asymmetry is inherited
    /// behavior, kept as two distinct predicates on purpose.
    pub fn toggle_like(&self, post_id: &str, user_id: &str) -> ServiceResult<LikeState> {
        enum Outcome {
            Toggled(LikeState),
            PostMissing,
            UserMissing,
            WrongInstitution,
        }

        let outcome = self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(Outcome::PostMissing);
            };
            let Some(user) = repos.users().get(user_id)? else {
                return Ok(Outcome::UserMissing);
            };
            let Some(author) = repos.users().get(&post.author_id)? else {
                return Ok(Outcome::PostMissing);
            };
            if user.university != author.university {
                return Ok(Outcome::WrongInstitution);
            }

            let likes = repos.likes();
            let liked = if likes.exists(&post.id, &user.id)? {
                likes.remove(&post.id, &user.id)?;
                false
            } else {
                likes.add(&post.id, &user.id, &now_utc_iso())?;
                if post.author_id != user.id {
                    notifications::record(&repos, &user.id, &post.author_id, NotificationKind::Like)?;
                }
                true
            };
            let like_count = likes.count_for_post(&post.id)?;
            Ok(Outcome::Toggled(LikeState { liked, like_count }))
        })?;

        match outcome {
            Outcome::Toggled(state) => Ok(state),
            Outcome::PostMissing => Err(ServiceError::not_found("post not found")),
            Outcome::UserMissing => Err(ServiceError::not_found("user not found")),
            Outcome::WrongInstitution => Err(ServiceError::forbidden(
                "you are not authorized to like this post",
            )),
        }
    }

    pub fn get_post(&self, post_id: &str) -> ServiceResult<PostView> {
        let view = self.database.with_repositories(|repos| {
            let Some(record) = repos.posts().get(post_id)? else {
                return Ok(None);
            };
            Ok(Some(build_post_view(&repos, record)?))
        })?;
        view.ok_or_else(|| ServiceError::not_found("post not found"))
    }
}
