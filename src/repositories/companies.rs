use sqlx::PgPool;
use uuid::Uuid;

use crate::models::company::{Company, CompanyListItem, CompanyWithCounts};
use crate::validation::Pagination;

use super::PagedResult;

pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, company: &Company) -> Result<Company, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies
                (id, organization_id, name, industry, size, revenue, location,
                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(company.id)
        .bind(company.organization_id)
        .bind(&company.name)
        .bind(&company.industry)
        .bind(&company.size)
        .bind(company.revenue)
        .bind(&company.location)
        .bind(&company.status)
        .bind(company.created_at)
        .bind(company.updated_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(
        &self,
        org: Uuid,
        id: Uuid,
    ) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE organization_id = $1 AND id = $2",
        )
        .bind(org)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, company: &Company) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $3, industry = $4, size = $5, revenue = $6,
                location = $7, status = $8, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(company.organization_id)
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.industry)
        .bind(&company.size)
        .bind(company.revenue)
        .bind(&company.location)
        .bind(&company.status)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, org: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE organization_id = $1 AND id = $2")
            .bind(org)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, org: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM companies WHERE organization_id = $1")
                .bind(org)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    /// Page of companies with live contact/deal counts, newest first.
    /// Counts are derived per page by correlated aggregation, never stored.
    pub async fn list(
        &self,
        org: Uuid,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<PagedResult<CompanyWithCounts>, sqlx::Error> {
        let (filter_sql, pattern) = match search.filter(|s| !s.is_empty()) {
            Some(term) => (
                "AND (c.name ILIKE $4 OR c.industry ILIKE $4)",
                Some(format!("%{}%", term)),
            ),
            None => ("", None),
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM companies c WHERE c.organization_id = $1 {}",
            filter_sql.replace("$4", "$2")
        );
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(org);
        if let Some(p) = &pattern {
            count_query = count_query.bind(p.clone());
        }
        let total = count_query.fetch_one(&self.pool).await?.0;

        let rows_sql = format!(
            r#"
            SELECT c.*,
                (SELECT COUNT(*) FROM contacts t
                  WHERE t.organization_id = c.organization_id AND t.company_id = c.id)
                  AS contact_count,
                (SELECT COUNT(*) FROM deals d
                  WHERE d.organization_id = c.organization_id AND d.company_id = c.id)
                  AS deal_count
            FROM companies c
            WHERE c.organization_id = $1 {}
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            filter_sql
        );
        let mut rows_query = sqlx::query_as::<_, CompanyWithCounts>(&rows_sql)
            .bind(org)
            .bind(page.limit)
            .bind(page.offset());
        if let Some(p) = &pattern {
            rows_query = rows_query.bind(p.clone());
        }
        let rows = rows_query.fetch_all(&self.pool).await?;

        Ok(PagedResult { rows, total })
    }

    /// Lightweight (id, name) projection for dropdowns
    pub async fn list_items(&self, org: Uuid) -> Result<Vec<CompanyListItem>, sqlx::Error> {
        sqlx::query_as::<_, CompanyListItem>(
            "SELECT id, name FROM companies WHERE organization_id = $1 ORDER BY name ASC",
        )
        .bind(org)
        .fetch_all(&self.pool)
        .await
    }
}
