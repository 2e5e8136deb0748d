use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Json, Router, extract::State, middleware, response::IntoResponse, routing::get};
use serde::Deserialize;

use crate::model::ResourceTyped;
use crate::model::entity::{LeaderboardRow, UserEntity, UserStatsRow};
use crate::web::dto::users::{LeaderboardEntry, UserStatsResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

const LEADERBOARD_DEFAULT_LIMIT: i64 = 50;
const LEADERBOARD_MAX_LIMIT: i64 = 100;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/stats", get(users_stats_handler))
        .route("/leaderboard", get(users_leaderboard_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/stats",
    description = "Current user's aggregated progress",
    responses(
        (status = 200, description = "Stats computed", body = UserStatsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("cookie" = [])
    )
)]
async fn users_stats_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let stats = UserStatsRow::fetch(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(UserStatsResponse::from(stats))))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LeaderboardQuery {
    state: Option<String>,
    district: Option<String>,
    limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/leaderboard",
    description = "Top users by points, optionally narrowed to a state/district",
    responses(
        (status = 200, description = "Leaderboard computed", body = Vec<LeaderboardEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users"
)]
async fn users_leaderboard_handler(
    Query(query): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
        .clamp(1, LEADERBOARD_MAX_LIMIT);

    let rows = LeaderboardRow::fetch(
        state.pool(),
        query.state.as_deref(),
        query.district.as_deref(),
        limit,
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let entries: Vec<LeaderboardEntry> = rows.into_iter().map(LeaderboardEntry::from).collect();

    Ok((StatusCode::OK, Json(entries)))
}
