use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router, extract::State, middleware, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::ResourceTyped;
use crate::model::entity::{ScamAlert, ScamAlertCreate};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, UserRole, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(scams_list_handler).post(scams_report_handler))
        .route("/{id}/verify", put(scams_verify_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScamListQuery {
    category: Option<String>,
    state: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/scams/",
    description = "Scam alert feed, newest first. Unverified reports are admin-only.",
    responses(
        (status = 200, description = "Alerts found", body = Vec<ScamAlert>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "scams"
)]
async fn scams_list_handler(
    State(state): State<AppState>,
    Query(query): Query<ScamListQuery>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(crate::web::AuthenticatedUser::admin);

    let include_unverified = ctx
        .maybe_user()
        .is_some_and(|u| u.user_role() == UserRole::Admin);

    let alerts = ScamAlert::feed(
        state.pool(),
        &actor,
        include_unverified,
        query.category.as_deref(),
        query.state.as_deref(),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(ScamAlert::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(alerts)))
}

#[utoipa::path(
    post,
    path = "/api/v1/scams/",
    description = "Report a scam. Reports stay hidden until an admin verifies them.",
    request_body = ScamAlertCreate,
    responses(
        (status = 200, description = "Alert reported", body = ScamAlert),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "scams"
)]
async fn scams_report_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ScamAlertCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let created = ScamAlert::report(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(ScamAlert::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/scams/{alert_id}/verify",
    description = "Mark a reported scam as verified",
    params(
        ("alert_id" = Uuid, Path, description = "ID of the alert to verify")
    ),
    responses(
        (status = 200, description = "Alert verified", body = ScamAlert),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "scams"
)]
async fn scams_verify_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    if user.user_role() != UserRole::Admin {
        return Err(WebError::resource_forbidden(ScamAlert::get_resource_type()));
    }

    let alert = ScamAlert::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(ScamAlert::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(ScamAlert::get_resource_type()))?;

    let verified = alert
        .verify(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(ScamAlert::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(verified)))
}
