use super::{ActingUser, ApiResult, AppState};
use crate::posts::{CommentView, CreatePostInput, LikeState, PostService, PostView};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

fn post_service(state: &AppState) -> PostService {
    PostService::new(
        state.database.clone(),
        state.moderation.clone(),
        state.assets.clone(),
    )
}

pub(super) async fn create_post_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Json(input): Json<CreatePostInput>,
) -> ApiResult<PostView> {
    let view = post_service(&state).create_post(&user_id, input).await?;
    Ok(Json(view))
}

pub(super) async fn get_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<PostView> {
    let view = post_service(&state).get_post(&post_id)?;
    Ok(Json(view))
}

#[derive(Serialize)]
pub(super) struct DeleteResponse {
    deleted: bool,
}

pub(super) async fn delete_post_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<String>,
) -> ApiResult<DeleteResponse> {
    post_service(&state).delete_post(&post_id, &user_id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}

#[derive(Deserialize)]
pub(super) struct CommentBody {
    text: String,
}

pub(super) async fn add_comment_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> ApiResult<CommentView> {
    let comment = post_service(&state).add_comment(&post_id, &user_id, &body.text)?;
    Ok(Json(comment))
}

pub(super) async fn toggle_like_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<String>,
) -> ApiResult<LikeState> {
    let like_state = post_service(&state).toggle_like(&post_id, &user_id)?;
    Ok(Json(like_state))
}
