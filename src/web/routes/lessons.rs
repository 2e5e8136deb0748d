use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router, extract::State, middleware, response::IntoResponse, routing::get};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::entity::{Lesson, LessonCompletion, UserEntity};
use crate::model::{CrudRepository, ResourceTyped};
use crate::web::dto::lessons::LessonCompleteResponse;
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(lessons_list_handler))
        .route("/{id}", get(lessons_get_handler))
        .route("/{id}/complete", post(lessons_complete_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LessonListQuery {
    category: Option<String>,
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LessonCompleteBody {
    score: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/",
    description = "List active lessons, optionally narrowed by category and difficulty",
    responses(
        (status = 200, description = "Lessons found", body = Vec<Lesson>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons"
)]
async fn lessons_list_handler(
    State(state): State<AppState>,
    Query(query): Query<LessonListQuery>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    // the catalog is public; anonymous reads run as the system actor
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(crate::web::AuthenticatedUser::admin);

    let lessons = Lesson::all_active(
        state.pool(),
        &actor,
        query.category.as_deref(),
        query.difficulty.as_deref(),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(lessons)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch comprehensive info about lesson including its content",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = Lesson),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(crate::web::AuthenticatedUser::admin);

    let lesson = Lesson::find_by_id(state.pool(), &actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/complete",
    description = "Mark lesson as completed and credit its reward. Repeated calls are inert.",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to complete")
    ),
    request_body = LessonCompleteBody,
    responses(
        (status = 200, description = "Lesson completed", body = LessonCompleteResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_complete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(body): Json<LessonCompleteBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let lesson = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    // single conditional insert; a lost race lands in the inert branch below
    let inserted =
        LessonCompletion::complete_once(state.pool(), user, id, body.score.unwrap_or(0))
            .await
            .map_err(|e| {
                WebError::resource_fetch_error(LessonCompletion::get_resource_type(), e)
            })?;

    let total_points = UserEntity::total_points(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let res = LessonCompleteResponse {
        message: "Lesson completed",
        points_earned: if inserted {
            lesson.points_reward() as i64
        } else {
            0
        },
        total_points,
    };

    Ok((StatusCode::OK, Json(res)))
}
