mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{Action, Flow, setup_server, setup_test_db, signup_action};

#[tokio::test]
async fn scam_reports_hidden_until_verified() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    signup_flow(&mut server).await;

    // report a scam as a regular user
    let report = server
        .post("/api/v1/scams/")
        .json(&json!({
            "title": "Fake KYC update call",
            "description": "Caller asks for OTP to 'renew' the bank KYC.",
            "category": "UPI Fraud",
            "severity": "High",
            "state": "Bihar",
        }))
        .await;
    report.assert_status(StatusCode::OK);
    let reported: Value = report.json();
    let alert_id = reported["id"].as_str().unwrap().to_string();

    // the public feed does not show it yet
    let feed = server.get("/api/v1/scams/").await;
    let alerts: Vec<Value> = feed.json();
    assert!(alerts.is_empty());

    // non-admin cannot verify
    server
        .put(&format!("/api/v1/scams/{}/verify", alert_id))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // promote and verify
    db.promote_to_admin("asha@example.in").await;
    let verify = server
        .put(&format!("/api/v1/scams/{}/verify", alert_id))
        .await;
    verify.assert_status(StatusCode::OK);
    let verified: Value = verify.json();
    assert_eq!(verified["verified"], true);
    assert!(verified["verified_at"].is_string());

    // now it is public
    let feed = server.get("/api/v1/scams/").await;
    let alerts: Vec<Value> = feed.json();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["title"], "Fake KYC update call");

    // category filter applies
    let feed = server
        .get("/api/v1/scams/")
        .add_query_param("category", "Phishing")
        .await;
    let alerts: Vec<Value> = feed.json();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn scam_report_requires_auth() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    server
        .post("/api/v1/scams/")
        .json(&json!({
            "title": "anon",
            "description": "anon",
            "category": "Other",
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

async fn signup_flow(server: &mut axum_test::TestServer) {
    server.save_cookies();
    server
        .post("/api/v1/account/signup")
        .json(&json!({
            "name": "Asha",
            "email": "asha@example.in",
            "password": "foobaz1",
        }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_are_gated() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    // ordinary users bounce off the admin surface
    Flow::new()
        .step(signup_action("Ravi", "ravi@example.in", "foobaz1").with_save_cookies(true))
        .step(
            Action::new("lesson_create", "POST", "/api/v1/admin/lessons")
                .with_body(json!({
                    "title": "Forbidden",
                    "description": "nope",
                    "category": "Banking",
                    "content": "nope",
                }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("user_page", "GET", "/api/v1/admin/users/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn admin_creates_content_and_awards_badges() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    signup_flow(&mut server).await;
    // the role is read from the database per request, no re-login needed
    db.promote_to_admin("asha@example.in").await;

    let lesson = server
        .post("/api/v1/admin/lessons")
        .json(&json!({
            "title": "Net banking 101",
            "description": "First steps",
            "category": "Banking",
            "content": "Open the bank app...",
            "points_reward": 10,
        }))
        .await;
    lesson.assert_status(StatusCode::OK);
    let lesson: Value = lesson.json();

    // a quiz without questions is refused at authoring time
    server
        .post("/api/v1/admin/quizzes")
        .json(&json!({
            "lesson_id": lesson["id"],
            "title": "Empty quiz",
            "questions": [],
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // as is an out-of-range answer key
    server
        .post("/api/v1/admin/quizzes")
        .json(&json!({
            "title": "Broken key",
            "questions": [
                { "question": "?", "options": ["a", "b"], "correct_answer": 5 }
            ],
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let quiz = server
        .post("/api/v1/admin/quizzes")
        .json(&json!({
            "lesson_id": lesson["id"],
            "title": "Net banking check",
            "questions": [
                { "question": "?", "options": ["a", "b"], "correct_answer": 1 }
            ],
        }))
        .await;
    quiz.assert_status(StatusCode::OK);

    // badge award is the only path that mutates the badge set
    let me = server.get("/api/v1/account/me").await;
    let me: Value = me.json();
    let user_id = me["user"]["id"].as_str().unwrap().to_string();

    server
        .post("/api/v1/admin/badges")
        .json(&json!({ "user_id": user_id, "badge": "Early Adopter" }))
        .await
        .assert_status(StatusCode::OK);

    let stats = server.get("/api/v1/users/stats").await;
    let stats: Value = stats.json();
    assert_eq!(stats["badges_count"], 1);

    let dashboard = server.get("/api/v1/admin/stats").await;
    dashboard.assert_status(StatusCode::OK);
    let dashboard: Value = dashboard.json();
    assert_eq!(dashboard["total_users"], 1);
    assert_eq!(dashboard["total_lessons"], 1);
    assert_eq!(dashboard["total_quizzes"], 1);
}
