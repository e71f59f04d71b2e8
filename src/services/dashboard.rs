use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::ApiError;
use crate::models::{Deal, DealStage};

/// Months of trailing revenue in the chart series
const REVENUE_SERIES_MONTHS: u32 = 6;
/// Days covered by the recent-activity feed
const FEED_WINDOW_DAYS: i64 = 7;
const FEED_CAP: usize = 10;
const TOP_DEALS_CAP: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub activities: Vec<FeedItem>,
    pub top_deals: Vec<Deal>,
    pub charts: DashboardCharts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_contacts: i64,
    pub total_companies: i64,
    pub active_deals: i64,
    pub monthly_revenue: f64,
    /// Revenue growth vs the previous calendar month, in percent
    pub revenue_growth: i64,
    pub contact_growth: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub description: String,
    pub entity: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub revenue: Vec<RevenuePoint>,
    pub pipeline: Vec<PipelineSlice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    /// Calendar month, "YYYY-MM"
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSlice {
    pub stage: String,
    pub count: i64,
    pub value: f64,
}

/// On-demand tenant summary statistics. Nothing here is cached or
/// materialized; every call recomputes from storage.
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn summary(&self, org: Uuid) -> Result<DashboardData, ApiError> {
        let now = Utc::now();

        let total_contacts = self.count_rows("contacts", org).await?;
        let total_companies = self.count_rows("companies", org).await?;
        let active_deals = self.active_deal_count(org).await?;

        let revenue = self.revenue_series(org, now).await?;
        let monthly_revenue = revenue.last().map(|p| p.revenue).unwrap_or(0.0);
        let previous_revenue = revenue
            .len()
            .checked_sub(2)
            .and_then(|i| revenue.get(i))
            .map(|p| p.revenue)
            .unwrap_or(0.0);

        let (month_start, _) = month_bounds(now, 0);
        let (prev_start, prev_end) = month_bounds(now, 1);
        let contacts_this_month = self.contacts_created_between(org, month_start, now).await?;
        let contacts_prev_month = self
            .contacts_created_between(org, prev_start, prev_end)
            .await?;

        let stats = DashboardStats {
            total_contacts,
            total_companies,
            active_deals,
            monthly_revenue,
            revenue_growth: growth_pct(previous_revenue, monthly_revenue),
            contact_growth: growth_pct(contacts_prev_month as f64, contacts_this_month as f64),
        };

        Ok(DashboardData {
            stats,
            activities: self.recent_feed(org, now).await?,
            top_deals: self.top_deals(org).await?,
            charts: DashboardCharts {
                revenue,
                pipeline: self.pipeline(org).await?,
            },
        })
    }

    async fn count_rows(&self, table: &str, org: Uuid) -> Result<i64, ApiError> {
        // table names come from the two call sites above, never from input
        let sql = format!("SELECT COUNT(*) FROM {} WHERE organization_id = $1", table);
        let count: (i64,) = sqlx::query_as(&sql)
            .bind(org)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count.0)
    }

    async fn active_deal_count(&self, org: Uuid) -> Result<i64, ApiError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM deals
            WHERE organization_id = $1 AND stage NOT IN ($2, $3)
            "#,
        )
        .bind(org)
        .bind(DealStage::ClosedWon.as_str())
        .bind(DealStage::ClosedLost.as_str())
        .fetch_one(self.db.pool())
        .await?;
        Ok(count.0)
    }

    async fn contacts_created_between(
        &self,
        org: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, ApiError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM contacts
            WHERE organization_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(org)
        .bind(from)
        .bind(to)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count.0)
    }

    /// Won revenue per calendar month, oldest first, ending with the
    /// current month
    async fn revenue_series(
        &self,
        org: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RevenuePoint>, ApiError> {
        let mut series = Vec::with_capacity(REVENUE_SERIES_MONTHS as usize);
        for back in (0..REVENUE_SERIES_MONTHS).rev() {
            let (start, end) = month_bounds(now, back);
            let revenue: (f64,) = sqlx::query_as(
                r#"
                SELECT COALESCE(SUM(value), 0) FROM deals
                WHERE organization_id = $1 AND stage = $2
                  AND created_at >= $3 AND created_at < $4
                "#,
            )
            .bind(org)
            .bind(DealStage::ClosedWon.as_str())
            .bind(start)
            .bind(end)
            .fetch_one(self.db.pool())
            .await?;

            series.push(RevenuePoint {
                month: format!("{:04}-{:02}", start.year(), start.month()),
                revenue: revenue.0,
            });
        }
        Ok(series)
    }

    /// Union of contacts, companies and deals touched in the trailing week,
    /// newest first, capped
    async fn recent_feed(
        &self,
        org: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<FeedItem>, ApiError> {
        let since = now - Duration::days(FEED_WINDOW_DAYS);
        let mut feed = Vec::new();

        let contacts: Vec<(String, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT first_name, last_name, created_at, updated_at FROM contacts
            WHERE organization_id = $1 AND updated_at >= $2
            ORDER BY updated_at DESC LIMIT $3
            "#,
        )
        .bind(org)
        .bind(since)
        .bind(FEED_CAP as i64)
        .fetch_all(self.db.pool())
        .await?;
        for (first, last, created, updated) in contacts {
            let verb = if created == updated { "added" } else { "updated" };
            feed.push(FeedItem {
                description: format!("Contact {} {} was {}", first, last, verb),
                entity: "contact",
                timestamp: updated,
            });
        }

        let companies: Vec<(String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT name, created_at, updated_at FROM companies
            WHERE organization_id = $1 AND updated_at >= $2
            ORDER BY updated_at DESC LIMIT $3
            "#,
        )
        .bind(org)
        .bind(since)
        .bind(FEED_CAP as i64)
        .fetch_all(self.db.pool())
        .await?;
        for (name, created, updated) in companies {
            let verb = if created == updated { "added" } else { "updated" };
            feed.push(FeedItem {
                description: format!("Company {} was {}", name, verb),
                entity: "company",
                timestamp: updated,
            });
        }

        let deals: Vec<(String, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT title, stage, created_at, updated_at FROM deals
            WHERE organization_id = $1 AND updated_at >= $2
            ORDER BY updated_at DESC LIMIT $3
            "#,
        )
        .bind(org)
        .bind(since)
        .bind(FEED_CAP as i64)
        .fetch_all(self.db.pool())
        .await?;
        for (title, stage, created, updated) in deals {
            let verb = if created == updated {
                "created".to_string()
            } else {
                format!("moved to {}", stage)
            };
            feed.push(FeedItem {
                description: format!("Deal {} was {}", title, verb),
                entity: "deal",
                timestamp: updated,
            });
        }

        feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        feed.truncate(FEED_CAP);
        Ok(feed)
    }

    async fn top_deals(&self, org: Uuid) -> Result<Vec<Deal>, ApiError> {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE organization_id = $1 AND stage NOT IN ($2, $3)
            ORDER BY value DESC LIMIT $4
            "#,
        )
        .bind(org)
        .bind(DealStage::ClosedWon.as_str())
        .bind(DealStage::ClosedLost.as_str())
        .bind(TOP_DEALS_CAP)
        .fetch_all(self.db.pool())
        .await?;
        Ok(deals)
    }

    async fn pipeline(&self, org: Uuid) -> Result<Vec<PipelineSlice>, ApiError> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(
            r#"
            SELECT stage, COUNT(*), COALESCE(SUM(value), 0) FROM deals
            WHERE organization_id = $1
            GROUP BY stage
            "#,
        )
        .bind(org)
        .fetch_all(self.db.pool())
        .await?;

        // Present every stage in pipeline order, zero-filled
        let slices = DealStage::ALL
            .iter()
            .map(|stage| {
                let found = rows.iter().find(|(s, _, _)| s == stage.as_str());
                PipelineSlice {
                    stage: stage.as_str().to_string(),
                    count: found.map(|(_, c, _)| *c).unwrap_or(0),
                    value: found.map(|(_, _, v)| *v).unwrap_or(0.0),
                }
            })
            .collect();
        Ok(slices)
    }
}

/// Growth percentage with the zero-baseline convention: 100% when something
/// appeared from nothing, 0% when both periods are empty
pub fn growth_pct(previous: f64, current: f64) -> i64 {
    if previous == 0.0 {
        if current > 0.0 {
            100
        } else {
            0
        }
    } else {
        ((current - previous) / previous * 100.0).round() as i64
    }
}

/// Start (inclusive) and end (exclusive) of the calendar month `back`
/// months before `now`
fn month_bounds(now: DateTime<Utc>, back: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let months = now.year() * 12 + now.month0() as i32 - back as i32;
    let (start_y, start_m) = (months.div_euclid(12), months.rem_euclid(12) as u32 + 1);
    let next = months + 1;
    let (end_y, end_m) = (next.div_euclid(12), next.rem_euclid(12) as u32 + 1);

    let start = Utc
        .with_ymd_and_hms(start_y, start_m, 1, 0, 0, 0)
        .single()
        .expect("valid month start");
    let end = Utc
        .with_ymd_and_hms(end_y, end_m, 1, 0, 0, 0)
        .single()
        .expect("valid month start");
    (start, end)
}
