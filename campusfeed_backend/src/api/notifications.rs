use super::{ActingUser, ApiResult, AppState};
use crate::notifications::{NotificationService, NotificationView};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

fn notification_service(state: &AppState) -> NotificationService {
    NotificationService::new(state.database.clone())
}

pub(super) async fn list_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> ApiResult<Vec<NotificationView>> {
    let views = notification_service(&state).list(&user_id)?;
    Ok(Json(views))
}

#[derive(Serialize)]
pub(super) struct UnreadCountResponse {
    unread: usize,
}

pub(super) async fn unread_count_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> ApiResult<UnreadCountResponse> {
    let unread = notification_service(&state).count_unread(&user_id)?;
    Ok(Json(UnreadCountResponse { unread }))
}

#[derive(Serialize)]
pub(super) struct ReadResponse {
    read: bool,
}

pub(super) async fn mark_read_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Path(notification_id): Path<String>,
) -> ApiResult<ReadResponse> {
    notification_service(&state).mark_read(&notification_id, &user_id)?;
    Ok(Json(ReadResponse { read: true }))
}

#[derive(Serialize)]
pub(super) struct ClearResponse {
    deleted: usize,
}

pub(super) async fn clear_handler(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> ApiResult<ClearResponse> {
    let deleted = notification_service(&state).clear_all(&user_id)?;
    Ok(Json(ClearResponse { deleted }))
}
