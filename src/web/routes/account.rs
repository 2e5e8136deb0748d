use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Duration;
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    Config,
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            LessonCompletion, QuizAttempt, UserBadge, UserEntity, UserEntityCreateUpdate,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::users::MeResponse,
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProfileBody {
    pub name: String,
    pub phone: Option<String>,
    pub language: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/me", get(account_me_handler))
        .route("/profile", put(account_profile_handler))
        .route("/verify", get(account_verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(account_signup_handler))
        .route("/signin", post(account_signin_handler))
        .merge(protected)
        .with_state(state)
}

fn issue_session_cookie(cookies: &Cookies, user_id: uuid::Uuid, jwt_key: &str) -> WebResult<()> {
    let timestamp = (chrono::Utc::now() + Duration::days(7)).timestamp();
    let claims = UserClaims {
        sub: user_id.to_string(),
        exp: timestamp,
    };

    let token = auth::generate_token(claims, jwt_key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = SignupBody,
    description = "Creates new user in database",
    responses(
        (status = 200, description = "User created successfully", body = UserEntity),
        (status = 400, description = "Invalid registration fields", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn account_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(WebError::registration_invalid_field(
            "name and email are required",
        ));
    }
    if payload.password.len() < 6 {
        return Err(WebError::registration_invalid_field(
            "password must be at least 6 characters",
        ));
    }

    let email = payload.email.trim().to_lowercase();

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let payload = UserEntityCreateUpdate {
        name: payload.name.trim().to_string(),
        email,
        phone: payload.phone.map(|p| p.trim().to_string()),
        password_hash: hash,
        language: payload.language.unwrap_or_else(|| String::from("en")),
        state: None,
        district: None,
    };

    let created = UserEntity::create(state.pool(), &admin, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let jwt_key = Config::get_or_init(false).await.app().jwt();
    issue_session_cookie(&cookies, created.id(), jwt_key)?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system",
    request_body = SigninBody,
    responses(
        (status = 200, description = "User signed in", body = UserEntity),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn account_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let email = payload.email.trim().to_lowercase();

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let jwt_key = Config::get_or_init(false).await.app().jwt();
    issue_session_cookie(&cookies, found.id(), jwt_key)?;

    Ok((StatusCode::OK, Json(found)))
}

async fn account_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    let user = ctx.maybe_user();

    if user.is_none() {
        return Ok(StatusCode::UNAUTHORIZED);
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/account/me",
    description = "Current user's profile together with their progress ledger",
    responses(
        (status = 200, description = "Profile found", body = MeResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let (points, badges, completed_lessons, quiz_attempts) = tokio::try_join!(
        UserEntity::total_points(state.pool(), user.user_id()),
        UserBadge::all_for_user(state.pool(), user),
        LessonCompletion::all_for_user(state.pool(), user),
        QuizAttempt::all_for_user(state.pool(), user),
    )
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let res = MeResponse::new(found, points, badges, completed_lessons, quiz_attempts);

    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/profile",
    request_body = ProfileBody,
    description = "Updates current user's profile fields",
    responses(
        (status = 200, description = "Profile updated", body = UserEntity),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProfileBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let data = UserEntityCreateUpdate {
        name: payload.name,
        email: found.email().to_string(),
        phone: payload.phone,
        password_hash: String::new(), // not in use
        language: payload
            .language
            .unwrap_or_else(|| found.language().to_string()),
        state: payload.state,
        district: payload.district,
    };

    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}
