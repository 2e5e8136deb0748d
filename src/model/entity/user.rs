use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: uuid::Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    #[serde(skip)]
    password_hash: String,
    role: String,
    language: String,
    state: Option<String>,
    district: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreateUpdate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub language: String,
    pub state: Option<String>,
    pub district: Option<String>,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, uuid::Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let role = UserRole::User.to_string();
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, phone, password_hash, role, language, state, district) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) RETURNING id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.password_hash)
        .bind(&role)
        .bind(&data.language)
        .bind(&data.state)
        .bind(&data.district)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        let created_at = result.try_get("created_at")?;
        Ok(UserEntity {
            id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            password_hash: data.password_hash,
            role,
            language: data.language,
            state: data.state,
            district: data.district,
            created_at,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE users SET name = $1, phone = $2, language = $3, state = $4, district = $5 WHERE id = $6",
        )
        .bind(&data.name)
        .bind(&data.phone)
        .bind(&data.language)
        .bind(&data.state)
        .bind(&data.district)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.name = data.name;
        self.phone = data.phone;
        self.language = data.language;
        self.state = data.state;
        self.district = data.district;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM users LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreateUpdate, Uuid);

impl UserEntity {
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }
        Ok(Some(result?))
    }

    /// Point total as a pure function of the completion tables. There is no
    /// stored counter to drift out of sync with the sets it mirrors.
    pub async fn total_points(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<i64> {
        let points: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COALESCE((SELECT SUM(l.points_reward)::BIGINT
                          FROM lesson_completions lc
                          JOIN lessons l ON l.id = lc.lesson_id
                          WHERE lc.user_id = $1), 0)
              + COALESCE((SELECT SUM(q.points_reward)::BIGINT
                          FROM quiz_attempts qa
                          JOIN quizzes q ON q.id = qa.quiz_id
                          WHERE qa.user_id = $1 AND qa.passed), 0)
            "#,
        )
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(points)
    }
}

/// Level thresholds: under 100 Beginner, under 300 Intermediate, under 600
/// Advanced, Expert from there on.
pub fn level_for_points(points: i64) -> &'static str {
    match points {
        ..100 => "Beginner",
        100..300 => "Intermediate",
        300..600 => "Advanced",
        _ => "Expert",
    }
}

// Utils

#[derive(Debug, Serialize, FromRow)]
pub struct UserStatsRow {
    pub total_points: i64,
    pub badges_count: i64,
    pub lessons_completed: i64,
    pub quizzes_completed: i64,
    pub average_quiz_score: i64,
}

impl UserStatsRow {
    pub async fn fetch(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<Self> {
        let row: UserStatsRow = sqlx::query_as(
            r#"
            SELECT
                COALESCE((SELECT SUM(l.points_reward)::BIGINT
                          FROM lesson_completions lc
                          JOIN lessons l ON l.id = lc.lesson_id
                          WHERE lc.user_id = $1), 0)
              + COALESCE((SELECT SUM(q.points_reward)::BIGINT
                          FROM quiz_attempts qa
                          JOIN quizzes q ON q.id = qa.quiz_id
                          WHERE qa.user_id = $1 AND qa.passed), 0) AS total_points,
                (SELECT COUNT(*) FROM user_badges b WHERE b.user_id = $1) AS badges_count,
                (SELECT COUNT(*) FROM lesson_completions lc WHERE lc.user_id = $1) AS lessons_completed,
                (SELECT COUNT(*) FROM quiz_attempts qa WHERE qa.user_id = $1) AS quizzes_completed,
                COALESCE((SELECT ROUND(AVG(qa.score))::BIGINT
                          FROM quiz_attempts qa
                          WHERE qa.user_id = $1), 0) AS average_quiz_score
            "#,
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub name: String,
    pub points: i64,
    pub badges: Vec<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardRow {
    /// Ranked by derived points descending; ties go to the earlier account.
    pub async fn fetch(
        mm: &ModelManager,
        state: Option<&str>,
        district: Option<&str>,
        limit: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<LeaderboardRow> = sqlx::query_as(
            r#"
            SELECT
                u.id,
                u.name,
                COALESCE(lp.points, 0) + COALESCE(qp.points, 0) AS points,
                COALESCE((SELECT ARRAY_AGG(b.badge ORDER BY b.awarded_at)
                          FROM user_badges b WHERE b.user_id = u.id), '{}') AS badges,
                u.state,
                u.district,
                u.created_at
            FROM users u
            LEFT JOIN (
                SELECT lc.user_id, SUM(l.points_reward)::BIGINT AS points
                FROM lesson_completions lc
                JOIN lessons l ON l.id = lc.lesson_id
                GROUP BY lc.user_id
            ) lp ON lp.user_id = u.id
            LEFT JOIN (
                SELECT qa.user_id, SUM(q.points_reward)::BIGINT AS points
                FROM quiz_attempts qa
                JOIN quizzes q ON q.id = qa.quiz_id
                WHERE qa.passed
                GROUP BY qa.user_id
            ) qp ON qp.user_id = u.id
            WHERE ($1::TEXT IS NULL OR u.state = $1)
              AND ($2::TEXT IS NULL OR u.district = $2)
            ORDER BY points DESC, u.created_at ASC
            LIMIT $3
            "#,
        )
        .bind(state)
        .bind(district)
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(level_for_points(0), "Beginner");
        assert_eq!(level_for_points(99), "Beginner");
        assert_eq!(level_for_points(100), "Intermediate");
        assert_eq!(level_for_points(299), "Intermediate");
        assert_eq!(level_for_points(300), "Advanced");
        assert_eq!(level_for_points(599), "Advanced");
        assert_eq!(level_for_points(600), "Expert");
    }
}
