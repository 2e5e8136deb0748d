use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Passive badge set. Nothing in the request path evaluates badge
/// requirements; awards come only from the explicit admin operation.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserBadge {
    id: Uuid,
    user_id: Uuid,
    badge: String,
    awarded_at: DateTime<Utc>,
}

impl ResourceTyped for UserBadge {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Badge
    }
}

impl UserBadge {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn badge(&self) -> &str {
        &self.badge
    }

    pub fn awarded_at(&self) -> &DateTime<Utc> {
        &self.awarded_at
    }

    pub async fn award(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        badge: &str,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO user_badges (id, user_id, badge)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, badge, awarded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(badge)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn all_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT * FROM user_badges WHERE user_id = $1 ORDER BY awarded_at ASC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
