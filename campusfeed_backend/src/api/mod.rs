mod feeds;
mod notifications;
mod posts;
mod users;

use crate::config::CampusfeedConfig;
use crate::database::Database;
use crate::error::ServiceError;
use crate::moderation::ModerationPipeline;
use crate::oracles::{AssetStore, CodeSender};
use anyhow::Result;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: CampusfeedConfig,
    pub database: Database,
    pub moderation: ModerationPipeline,
    pub assets: Arc<dyn AssetStore>,
    pub code_sender: Arc<dyn CodeSender>,
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(String),
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    ModerationRejected(String),
    Upstream(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse { message: msg })
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { message: msg }),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse { message: msg }),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse { message: msg }),
            ApiError::ModerationRejected(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse { message: msg },
            ),
            ApiError::Upstream(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse { message: msg },
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::ModerationRejected(msg) => ApiError::ModerationRejected(msg),
            ServiceError::Upstream(msg) => ApiError::Upstream(msg),
            ServiceError::Internal(err) => ApiError::Internal(err),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

/// The authenticated acting user, resolved upstream by the identity
/// capability and handed to us as the `x-user-id` header. Services still
/// validate that the id refers to a real member.
pub struct ActingUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ActingUser(value.to_string()))
            .ok_or_else(|| ApiError::Unauthenticated("missing x-user-id header".into()))
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

pub(crate) async fn health_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/users", post(users::register_handler))
        .route("/users/suggested", get(users::suggested_handler))
        .route("/users/profile", put(users::update_profile_handler))
        .route("/users/:id", get(users::get_user_handler))
        .route("/users/:id/follow", post(users::follow_toggle_handler))
        .route("/users/:id/followers", get(users::followers_handler))
        .route("/users/:id/following", get(users::following_handler))
        .route("/posts", post(posts::create_post_handler))
        .route(
            "/posts/:id",
            get(posts::get_post_handler).delete(posts::delete_post_handler),
        )
        .route("/posts/:id/comments", post(posts::add_comment_handler))
        .route("/posts/:id/like", post(posts::toggle_like_handler))
        .route("/feeds/all", get(feeds::all_feed_handler))
        .route("/feeds/following", get(feeds::following_feed_handler))
        .route("/feeds/category/:category", get(feeds::category_feed_handler))
        .route("/feeds/user/:username", get(feeds::author_feed_handler))
        .route("/feeds/liked/:user_id", get(feeds::liked_feed_handler))
        .route(
            "/notifications",
            get(notifications::list_handler).delete(notifications::clear_handler),
        )
        .route(
            "/notifications/unread/count",
            get(notifications::unread_count_handler),
        )
        .route(
            "/notifications/:id/read",
            post(notifications::mark_read_handler),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve_http(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.api_port));
    let router = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
