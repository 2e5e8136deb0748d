use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::account_signup_handler,
        crate::web::routes::account::account_signin_handler,
        crate::web::routes::account::account_me_handler,
        crate::web::routes::account::account_profile_handler,
        crate::web::routes::lessons::lessons_list_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_complete_handler,
        crate::web::routes::quizzes::quizzes_get_handler,
        crate::web::routes::quizzes::quizzes_submit_handler,
        crate::web::routes::users::users_stats_handler,
        crate::web::routes::users::users_leaderboard_handler,
        crate::web::routes::scams::scams_list_handler,
        crate::web::routes::scams::scams_report_handler,
        crate::web::routes::scams::scams_verify_handler,
        crate::web::routes::investments::investments_calculate_handler,
        crate::web::routes::admin::admin_lesson_create_handler,
        crate::web::routes::admin::admin_lesson_update_handler,
        crate::web::routes::admin::admin_lesson_delete_handler,
        crate::web::routes::admin::admin_quiz_create_handler,
        crate::web::routes::admin::admin_badge_award_handler,
        crate::web::routes::admin::admin_user_list_handler,
        crate::web::routes::admin::admin_stats_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
