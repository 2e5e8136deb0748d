use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ScamAlert {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    severity: String,
    state: Option<String>,
    district: Option<String>,
    reported_by: Option<Uuid>,
    verified: bool,
    verified_by: Option<Uuid>,
    verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ScamAlertCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
}

impl ResourceTyped for ScamAlert {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::ScamAlert
    }
}

impl ScamAlert {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub async fn report(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: ScamAlertCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO scam_alerts (id, title, description, category, severity, state, district, reported_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.severity.as_deref().unwrap_or("Medium"))
        .bind(&data.state)
        .bind(&data.district)
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    /// Feed listing, newest first, capped at 50. Unverified reports are
    /// visible only when `include_unverified` is set (admin callers).
    pub async fn feed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        include_unverified: bool,
        category: Option<&str>,
        state: Option<&str>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT * FROM scam_alerts
            WHERE (verified OR $1)
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::TEXT IS NULL OR state = $3)
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(include_unverified)
        .bind(category)
        .bind(state)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM scam_alerts WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }
        Ok(Some(result?))
    }

    pub async fn verify(
        mut self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self> {
        let row: (DateTime<Utc>,) = sqlx::query_as(
            "UPDATE scam_alerts SET verified = TRUE, verified_by = $1, verified_at = now() \
             WHERE id = $2 RETURNING verified_at",
        )
        .bind(actor.user_id())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.verified = true;
        self.verified_by = Some(actor.user_id());
        self.verified_at = Some(row.0);
        Ok(self)
    }

    pub async fn count(mm: &ModelManager, verified_only: bool) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scam_alerts WHERE verified OR NOT $1")
                .bind(verified_only)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }
}
