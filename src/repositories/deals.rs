use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Deal, DealStage};
use crate::validation::Pagination;

use super::PagedResult;

pub struct DealRepository {
    pool: PgPool,
}

impl DealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, deal: &Deal) -> Result<Deal, sqlx::Error> {
        sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals
                (id, organization_id, title, value, probability, stage,
                 contact_id, company_id, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(deal.id)
        .bind(deal.organization_id)
        .bind(&deal.title)
        .bind(deal.value)
        .bind(deal.probability)
        .bind(&deal.stage)
        .bind(deal.contact_id)
        .bind(deal.company_id)
        .bind(deal.assigned_to)
        .bind(deal.created_at)
        .bind(deal.updated_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, org: Uuid, id: Uuid) -> Result<Option<Deal>, sqlx::Error> {
        sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE organization_id = $1 AND id = $2")
            .bind(org)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update(&self, deal: &Deal) -> Result<Option<Deal>, sqlx::Error> {
        sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals SET
                title = $3, value = $4, probability = $5, stage = $6,
                contact_id = $7, company_id = $8, assigned_to = $9, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(deal.organization_id)
        .bind(deal.id)
        .bind(&deal.title)
        .bind(deal.value)
        .bind(deal.probability)
        .bind(&deal.stage)
        .bind(deal.contact_id)
        .bind(deal.company_id)
        .bind(deal.assigned_to)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, org: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE organization_id = $1 AND id = $2")
            .bind(org)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_stage(
        &self,
        org: Uuid,
        stage: DealStage,
    ) -> Result<Vec<Deal>, sqlx::Error> {
        sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE organization_id = $1 AND stage = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(org)
        .bind(stage.as_str())
        .fetch_all(&self.pool)
        .await
    }

    /// Page of deals, newest first; substring match on title only
    pub async fn list(
        &self,
        org: Uuid,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<PagedResult<Deal>, sqlx::Error> {
        match search.filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", term);
                let total: (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM deals WHERE organization_id = $1 AND title ILIKE $2",
                )
                .bind(org)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

                let rows = sqlx::query_as::<_, Deal>(
                    r#"
                    SELECT * FROM deals
                    WHERE organization_id = $1 AND title ILIKE $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(org)
                .bind(&pattern)
                .bind(page.limit)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

                Ok(PagedResult { rows, total: total.0 })
            }
            None => {
                let total: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM deals WHERE organization_id = $1")
                        .bind(org)
                        .fetch_one(&self.pool)
                        .await?;

                let rows = sqlx::query_as::<_, Deal>(
                    r#"
                    SELECT * FROM deals
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
    }
}
