use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router, extract::State, middleware, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{
    Lesson, LessonCreate, Quiz, QuizCreate, ScamAlert, UserBadge, UserEntity,
};
use crate::model::{CrudRepository, PaginatableRepository, ResourceTyped};
use crate::web::error::ErrorResponse;
use crate::web::routes::PaginationQuery;
use crate::web::{
    AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult, middlewares,
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/lessons", post(admin_lesson_create_handler))
        .route(
            "/lessons/{id}",
            put(admin_lesson_update_handler).delete(admin_lesson_delete_handler),
        )
        .route("/quizzes", post(admin_quiz_create_handler))
        .route("/badges", post(admin_badge_award_handler))
        .route("/users/page", get(admin_user_list_handler))
        .route("/stats", get(admin_stats_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn require_admin(ctx: &RequestContext) -> WebResult<&AuthenticatedUser> {
    let user = ctx.user()?;
    if user.user_role() != UserRole::Admin {
        return Err(WebError::resource_forbidden(UserEntity::get_resource_type()));
    }
    Ok(user)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons",
    request_body = LessonCreate,
    description = "Creates a lesson",
    responses(
        (status = 200, description = "Lesson created", body = Lesson),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_lesson_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let created = Lesson::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/lessons/{lesson_id}",
    request_body = LessonCreate,
    description = "Updates a lesson",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to update")
    ),
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_lesson_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let found = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons/{lesson_id}",
    description = "Deletes a lesson",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to delete")
    ),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_lesson_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let found = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/quizzes",
    request_body = QuizCreate,
    description = "Creates a quiz",
    responses(
        (status = 200, description = "Quiz created", body = Quiz),
        (status = 400, description = "Quiz has no questions", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_quiz_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    // refuse to author the zero-question quiz submissions would later reject
    if payload.questions.is_empty() {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            "a quiz needs at least one question",
        ));
    }

    for (i, q) in payload.questions.iter().enumerate() {
        let valid = q.correct_answer >= 0 && (q.correct_answer as usize) < q.options.len();
        if !valid {
            return Err(WebError::resource_bad_request(
                Quiz::get_resource_type(),
                format!("question {i} has an out-of-range correct answer"),
            ));
        }
    }

    let created = Quiz::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BadgeAwardBody {
    pub user_id: Uuid,
    pub badge: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/badges",
    request_body = BadgeAwardBody,
    description = "Awards a badge to a user",
    responses(
        (status = 200, description = "Badge awarded", body = UserBadge),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_badge_award_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<BadgeAwardBody>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let found = UserEntity::find_by_id(state.pool(), user, payload.user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_none() {
        return Err(WebError::resource_not_found(UserEntity::get_resource_type()));
    }

    let awarded = UserBadge::award(state.pool(), user, payload.user_id, &payload.badge)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserBadge::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(awarded)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/page",
    description = "Paginated user listing",
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<UserEntity>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_user_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let users = UserEntity::page(state.pool(), user, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminStatsResponse {
    total_users: i64,
    total_lessons: i64,
    total_quizzes: i64,
    total_scams: i64,
    verified_scams: i64,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    description = "Dashboard counts",
    responses(
        (status = 200, description = "Stats computed", body = AdminStatsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_stats_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = require_admin(&ctx)?;

    let (total_users, total_lessons, total_quizzes, total_scams, verified_scams) = tokio::try_join!(
        UserEntity::count(state.pool(), user),
        Lesson::count(state.pool(), user),
        Quiz::count(state.pool(), user),
        ScamAlert::count(state.pool(), false),
        ScamAlert::count(state.pool(), true),
    )
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let res = AdminStatsResponse {
        total_users,
        total_lessons,
        total_quizzes,
        total_scams,
        verified_scams,
    };

    Ok((StatusCode::OK, Json(res)))
}
