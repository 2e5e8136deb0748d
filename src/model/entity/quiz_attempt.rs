use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One row per (user, quiz) pair, ever — a failed first attempt is recorded
/// too and cannot be retried. Passed attempts contribute the quiz reward to
/// the user's derived point total.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttempt {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    score: i32,
    passed: bool,
    completed_at: DateTime<Utc>,
}

impl ResourceTyped for QuizAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizAttempt
    }
}

impl QuizAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn completed_at(&self) -> &DateTime<Utc> {
        &self.completed_at
    }

    /// Records the attempt unless one already exists for this (user, quiz)
    /// pair — same single conditional insert as lesson completion. Returns
    /// whether this call inserted; the caller reports points only when the
    /// inserted attempt passed.
    pub async fn record_once(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        quiz_id: Uuid,
        score: i32,
        passed: bool,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO quiz_attempts (id, user_id, quiz_id, score, passed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, quiz_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(quiz_id)
        .bind(score)
        .bind(passed)
        .execute(mm.executor())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn all_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE user_id = $1 ORDER BY completed_at ASC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
