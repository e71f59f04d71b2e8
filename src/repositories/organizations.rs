use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::Organization;

pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert inside a caller-supplied transaction so tenant signup can
    /// roll back the organization when the admin user insert fails.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        org: &Organization,
    ) -> Result<Organization, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations
                (id, name, slug, plan, status, settings,
                 billing_period_start, billing_period_end, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.slug)
        .bind(&org.plan)
        .bind(&org.status)
        .bind(&org.settings)
        .bind(org.billing_period_start)
        .bind(org.billing_period_end)
        .bind(org.created_at)
        .bind(org.updated_at)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn slug_taken(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM organizations WHERE slug = $1")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }
}
