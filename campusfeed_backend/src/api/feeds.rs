use super::{ActingUser, ApiError, ApiResult, AppState};
use crate::feed::{normalize_pagination, FeedKind, FeedPage, FeedService};
use crate::posts::PostCategory;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(super) struct FeedQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

fn assemble(state: &AppState, kind: FeedKind, query: FeedQuery) -> Result<FeedPage, ApiError> {
    let (page, limit) = normalize_pagination(query.page, query.limit);
    let page = FeedService::new(state.database.clone()).assemble(kind, page, limit)?;
    Ok(page)
}

pub(super) async fn all_feed_handler(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<FeedPage> {
    Ok(Json(assemble(&state, FeedKind::All, query)?))
}

pub(super) async fn following_feed_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Query(query): Query<FeedQuery>,
) -> ApiResult<FeedPage> {
    Ok(Json(assemble(&state, FeedKind::Following { user_id }, query)?))
}

pub(super) async fn category_feed_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<FeedPage> {
    let Some(category) = PostCategory::parse(&category) else {
        return Err(ApiError::BadRequest("invalid category".into()));
    };
    Ok(Json(assemble(&state, FeedKind::Category { category }, query)?))
}

pub(super) async fn author_feed_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<FeedPage> {
    Ok(Json(assemble(&state, FeedKind::Author { username }, query)?))
}

pub(super) async fn liked_feed_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<FeedPage> {
    Ok(Json(assemble(&state, FeedKind::LikedBy { user_id }, query)?))
}
