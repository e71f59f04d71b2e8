use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Contact;
use crate::validation::Pagination;

use super::PagedResult;

pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, contact: &Contact) -> Result<Contact, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts
                (id, organization_id, first_name, last_name, email, phone, job_title,
                 company_id, tags, status, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(contact.id)
        .bind(contact.organization_id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.job_title)
        .bind(contact.company_id)
        .bind(&contact.tags)
        .bind(&contact.status)
        .bind(contact.assigned_to)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(
        &self,
        org: Uuid,
        id: Uuid,
    ) -> Result<Option<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE organization_id = $1 AND id = $2",
        )
        .bind(org)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Persist the merged row, refreshing updated_at. Rows outside the
    /// caller's organization are invisible to this update.
    pub async fn update(&self, contact: &Contact) -> Result<Option<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET
                first_name = $3, last_name = $4, email = $5, phone = $6,
                job_title = $7, company_id = $8, tags = $9, status = $10,
                assigned_to = $11, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(contact.organization_id)
        .bind(contact.id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.job_title)
        .bind(contact.company_id)
        .bind(&contact.tags)
        .bind(&contact.status)
        .bind(contact.assigned_to)
        .fetch_optional(&self.pool)
        .await
    }

    /// Hard delete. Returns whether a row was removed.
    pub async fn delete(&self, org: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE organization_id = $1 AND id = $2")
            .bind(org)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, org: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE organization_id = $1")
                .bind(org)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    /// Page of contacts, newest first. `search` must already be sanitized;
    /// substring match is limited to first/last name and email.
    pub async fn list(
        &self,
        org: Uuid,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<PagedResult<Contact>, sqlx::Error> {
        match search.filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", term);
                let total: (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*) FROM contacts
                    WHERE organization_id = $1
                      AND (first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)
                    "#,
                )
                .bind(org)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

                let rows = sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT * FROM contacts
                    WHERE organization_id = $1
                      AND (first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)
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
                let total = self.count(org).await?;
                let rows = sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT * FROM contacts
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

                Ok(PagedResult { rows, total })
            }
        }
    }
}
