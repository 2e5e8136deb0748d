use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State, middleware, response::IntoResponse};
use uuid::Uuid;

use crate::model::entity::{Lesson, LessonCompletion, Quiz, QuizAttempt, UserEntity};
use crate::model::{CrudRepository, ResourceTyped};
use crate::web::dto::quizzes::{QuizResponse, QuizSubmitRequest, QuizSubmitResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(quizzes_get_handler))
        .route("/{id}/submit", post(quizzes_submit_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    description = "Fetch a quiz for taking; correct answers are not included",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz to get")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes"
)]
async fn quizzes_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(crate::web::AuthenticatedUser::admin);

    let quiz = Quiz::find_by_id(state.pool(), &actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    Ok((StatusCode::OK, Json(QuizResponse::from(quiz))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/submit",
    description = "Grade an answer sheet. Only the first submission per quiz is recorded; \
                   passing it credits the quiz reward and the underlying lesson.",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz to submit")
    ),
    request_body = QuizSubmitRequest,
    responses(
        (status = 200, description = "Submission graded", body = QuizSubmitResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 422, description = "Quiz has no questions", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(req): Json<QuizSubmitRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let quiz = Quiz::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    let grade = quiz.grade(&req.answers).ok_or_else(|| {
        WebError::resource_invalid_state(Quiz::get_resource_type(), "quiz has no questions")
    })?;

    // first submission wins, pass or fail; later ones change nothing
    let recorded = QuizAttempt::record_once(state.pool(), user, id, grade.score, grade.passed)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizAttempt::get_resource_type(), e))?;

    // passing also credits the underlying lesson, under its own idempotency
    if grade.passed
        && let Some(lesson_id) = quiz.lesson_id()
    {
        let lesson = Lesson::find_by_id(state.pool(), user, lesson_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

        if let Some(lesson) = lesson {
            LessonCompletion::complete_once(state.pool(), user, lesson.id(), grade.score)
                .await
                .map_err(|e| {
                    WebError::resource_fetch_error(LessonCompletion::get_resource_type(), e)
                })?;
        }
    }

    let total_points = UserEntity::total_points(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let res = QuizSubmitResponse {
        score: grade.score,
        passed: grade.passed,
        correct_count: grade.correct_count,
        total_questions: grade.total_questions,
        points_earned: if recorded && grade.passed {
            quiz.points_reward() as i64
        } else {
            0
        },
        total_points,
    };

    Ok((StatusCode::OK, Json(res)))
}
