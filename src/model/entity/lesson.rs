use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    difficulty: String,
    content: String,
    estimated_time: i32,
    points_reward: i32,
    quiz_id: Option<Uuid>,
    order_index: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn points_reward(&self) -> i32 {
        self.points_reward
    }

    pub fn quiz_id(&self) -> Option<Uuid> {
        self.quiz_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Option<String>,
    pub content: String,
    pub estimated_time: Option<i32>,
    pub points_reward: Option<i32>,
    pub quiz_id: Option<Uuid>,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, uuid::Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let difficulty = data.difficulty.unwrap_or_else(|| String::from("Beginner"));
        let result = sqlx::query(
            "INSERT INTO lessons (id, title, description, category, difficulty, content, estimated_time, points_reward, quiz_id, order_index) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10) RETURNING id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(&difficulty)
        .bind(&data.content)
        .bind(data.estimated_time.unwrap_or(5))
        .bind(data.points_reward.unwrap_or(10))
        .bind(data.quiz_id)
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        let created_at = result.try_get("created_at")?;
        Ok(Lesson {
            id,
            title: data.title,
            description: data.description,
            category: data.category,
            difficulty,
            content: data.content,
            estimated_time: data.estimated_time.unwrap_or(5),
            points_reward: data.points_reward.unwrap_or(10),
            quiz_id: data.quiz_id,
            order_index: data.order_index.unwrap_or(0),
            is_active: true,
            created_at,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let difficulty = data.difficulty.unwrap_or_else(|| String::from("Beginner"));
        sqlx::query(
            "UPDATE lessons SET title = $1, description = $2, category = $3, difficulty = $4, content = $5, \
             estimated_time = $6, points_reward = $7, quiz_id = $8, order_index = $9 WHERE id = $10",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(&difficulty)
        .bind(&data.content)
        .bind(data.estimated_time.unwrap_or(5))
        .bind(data.points_reward.unwrap_or(10))
        .bind(data.quiz_id)
        .bind(data.order_index.unwrap_or(0))
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.category = data.category;
        self.difficulty = difficulty;
        self.content = data.content;
        self.estimated_time = data.estimated_time.unwrap_or(5);
        self.points_reward = data.points_reward.unwrap_or(10);
        self.quiz_id = data.quiz_id;
        self.order_index = data.order_index.unwrap_or(0);
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    /// Catalog listing: active lessons only, optionally narrowed by category
    /// and difficulty, in curriculum order.
    pub async fn all_active(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        category: Option<&str>,
        difficulty: Option<&str>,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM lessons
            WHERE is_active
              AND ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR difficulty = $2)
            ORDER BY order_index ASC, created_at DESC
            "#,
        )
        .bind(category)
        .bind(difficulty)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}

impl_paginatable_for!(Lesson, LessonCreate, Uuid);
