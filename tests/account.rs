mod common;
use reqwest::StatusCode;
use saathi::model::entity::UserEntity;
use saathi::web::middlewares::AUTH_TOKEN;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{Action, Flow, setup_server, setup_test_db, signin_action, signup_action};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("Asha", "asha@example.in", "foobaz1")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(ent.name(), "Asha");
                    assert_eq!(ent.email(), "asha@example.in");
                })
                .with_expect(StatusCode::OK),
        )
        // email comparison is case-insensitive, signup twice must conflict
        .step(
            signup_action("Asha", "ASHA@Example.IN", "foobaz1").with_expect(StatusCode::CONFLICT),
        )
        // too short password
        .step(
            signup_action("Ravi", "ravi@example.in", "abc")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("Registration error"))),
        )
        // missing name
        .step(
            signup_action("", "blank@example.in", "foobaz1")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("Meera", "meera@example.in", "SIGNINTEST").with_save_cookies(false))
        .step(
            signin_action("meera@example.in", "SIGNINTEST")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(ent.name(), "Meera");
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong credentials
        .step(
            signin_action("meera@example.in", "WRONGPASSWORD")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| {
                    assert!(body.contains("Authentication error"));
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // non-existing account
        .step(
            signin_action("nonexisting@example.in", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_profile_update_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("Kiran", "kiran@example.in", "foobaz1").with_save_cookies(true))
        .step(
            Action::new("profile_update", "PUT", "/api/v1/account/profile")
                .with_body(json!({
                    "name": "Kiran Kumar",
                    "phone": "9876543210",
                    "state": "Bihar",
                    "district": "Patna",
                }))
                .with_expect(StatusCode::OK)
                .assert_body(|body| {
                    assert!(body.contains("Kiran Kumar"));
                    assert!(body.contains("Bihar"));
                }),
        )
        // profile changes show up on /me
        .step(
            Action::new("me", "GET", "/api/v1/account/me")
                .with_expect(StatusCode::OK)
                .assert_body(|body| {
                    assert!(body.contains("Kiran Kumar"));
                    assert!(body.contains("Patna"));
                    assert!(body.contains("\"points\":0"));
                    assert!(body.contains("Beginner"));
                }),
        )
        // unauthenticated update must bounce
        .step(
            Action::new("profile_update", "PUT", "/api/v1/account/profile")
                .with_clear_cookies(true)
                .with_save_cookies(false)
                .with_body(json!({ "name": "Nobody" }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_stats_empty_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("Zero", "zero@example.in", "foobaz1").with_save_cookies(true))
        // a fresh user has an empty ledger, average must be 0, not an error
        .step(
            Action::new("stats", "GET", "/api/v1/users/stats")
                .with_expect(StatusCode::OK)
                .assert_body(|body| {
                    assert!(body.contains("\"total_points\":0"));
                    assert!(body.contains("\"lessons_completed\":0"));
                    assert!(body.contains("\"quizzes_completed\":0"));
                    assert!(body.contains("\"average_quiz_score\":0"));
                    assert!(body.contains("\"badges_count\":0"));
                }),
        )
        .run(&mut server, pool)
        .await;
}
