use super::{ActingUser, ApiResult, AppState};
use crate::social::{FollowOutcome, SocialService};
use crate::users::{RegisterInput, UpdateProfileInput, UserProfile, UserService, UserSummary};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

fn user_service(state: &AppState) -> UserService {
    UserService::new(state.database.clone(), state.code_sender.clone())
}

pub(super) async fn register_handler(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<UserProfile> {
    let profile = user_service(&state).register(input)?;
    Ok(Json(profile))
}

pub(super) async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<UserProfile> {
    let profile = user_service(&state).get_profile(&user_id)?;
    Ok(Json(profile))
}

pub(super) async fn update_profile_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Json(input): Json<UpdateProfileInput>,
) -> ApiResult<UserProfile> {
    let profile = user_service(&state).update_profile(&user_id, input)?;
    Ok(Json(profile))
}

pub(super) async fn suggested_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> ApiResult<Vec<UserSummary>> {
    let suggestions = user_service(&state).suggested(&user_id)?;
    Ok(Json(suggestions))
}

#[derive(Serialize)]
pub(super) struct FollowResponse {
    outcome: FollowOutcome,
}

pub(super) async fn follow_toggle_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Path(target_id): Path<String>,
) -> ApiResult<FollowResponse> {
    let outcome = SocialService::new(state.database.clone()).follow_toggle(&user_id, &target_id)?;
    Ok(Json(FollowResponse { outcome }))
}

pub(super) async fn followers_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let members = SocialService::new(state.database.clone()).followers(&user_id)?;
    Ok(Json(members))
}

pub(super) async fn following_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let members = SocialService::new(state.database.clone()).following(&user_id)?;
    Ok(Json(members))
}
