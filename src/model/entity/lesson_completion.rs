use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One row per (user, lesson) pair, ever. Rows are only inserted, never
/// updated; the user's point total is derived from them on read.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonCompletion {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    score: i32,
    completed_at: DateTime<Utc>,
}

impl ResourceTyped for LessonCompletion {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonCompletion
    }
}

impl LessonCompletion {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn completed_at(&self) -> &DateTime<Utc> {
        &self.completed_at
    }

    /// Records the completion unless one already exists for this
    /// (user, lesson) pair. The membership check and the append are a single
    /// conditional insert, so concurrent duplicates collapse to one row no
    /// matter how they interleave. Returns whether this call inserted.
    pub async fn complete_once(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        score: i32,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO lesson_completions (id, user_id, lesson_id, score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, lesson_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(lesson_id)
        .bind(score)
        .execute(mm.executor())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn all_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT * FROM lesson_completions WHERE user_id = $1 ORDER BY completed_at ASC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
