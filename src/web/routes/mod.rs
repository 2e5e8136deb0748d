use crate::{
    Config,
    web::{AppState, doc::ApiDoc},
};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod account;
pub mod admin;
pub mod investments;
pub mod lessons;
pub mod quizzes;
pub mod scams;
pub mod users;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct PaginationQuery {
    limit: i64,
    offset: i64,
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .route("/api/v1/health", get(health_handler))
        .nest("/api/v1/account/", account::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/quizzes/", quizzes::routes(state.clone()))
        .nest("/api/v1/users/", users::routes(state.clone()))
        .nest("/api/v1/scams/", scams::routes(state.clone()))
        .nest("/api/v1/investments/", investments::routes(state.clone()))
        .nest("/api/v1/admin/", admin::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}
