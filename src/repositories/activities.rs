use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Activity;
use crate::validation::Pagination;

use super::PagedResult;

pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, activity: &Activity) -> Result<Activity, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities
                (id, organization_id, activity_type, subject, status, due_date,
                 contact_id, deal_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(activity.id)
        .bind(activity.organization_id)
        .bind(&activity.activity_type)
        .bind(&activity.subject)
        .bind(&activity.status)
        .bind(activity.due_date)
        .bind(activity.contact_id)
        .bind(activity.deal_id)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(
        &self,
        org: Uuid,
        id: Uuid,
    ) -> Result<Option<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE organization_id = $1 AND id = $2",
        )
        .bind(org)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, activity: &Activity) -> Result<Option<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities SET
                activity_type = $3, subject = $4, status = $5, due_date = $6,
                contact_id = $7, deal_id = $8, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(activity.organization_id)
        .bind(activity.id)
        .bind(&activity.activity_type)
        .bind(&activity.subject)
        .bind(&activity.status)
        .bind(activity.due_date)
        .bind(activity.contact_id)
        .bind(activity.deal_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, org: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM activities WHERE organization_id = $1 AND id = $2")
                .bind(org)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        org: Uuid,
        page: Pagination,
    ) -> Result<PagedResult<Activity>, sqlx::Error> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM activities WHERE organization_id = $1")
                .bind(org)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE organization_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(org)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult { rows, total: total.0 })
    }
}
