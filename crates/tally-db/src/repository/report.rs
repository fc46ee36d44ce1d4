//! # Report Repository
//!
//! Read-only aggregates for the dashboard and the revenue stats endpoint.
//!
//! ## Dashboard Queries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Dashboard Assembly                                   │
//! │                                                                         │
//! │  totals            COALESCE(SUM(total_cents), 0), COUNT(*)  ← sales    │
//! │                    COALESCE(SUM(amount_cents), 0)           ← expenses │
//! │  recent_sales      ORDER BY date DESC, id DESC LIMIT 5                 │
//! │  recent_expenses   ORDER BY date DESC, id DESC LIMIT 5                 │
//! │  top_items         sale_items GROUP BY item_name                       │
//! │                    LEFT JOIN items ON name (current id, nullable)      │
//! │  expense_breakdown expenses GROUP BY category + GROUP_CONCAT(id)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tally_core::Dashboard::new(..)  → net_profit = revenue − expenses     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dashboard reads run inside one read transaction, so every panel
//! comes from the same WAL snapshot even while sales are being written.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{
    CategoryTotal, Dashboard, Expense, Money, MonthlyRevenue, Sale, TopItem, Totals,
    DASHBOARD_PANEL_SIZE,
};

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the dashboard. Every aggregate is zero on an empty store.
    pub async fn dashboard(&self) -> DbResult<Dashboard> {
        // Deferred BEGIN: the first SELECT pins the snapshot
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let totals = totals(&mut tx).await?;
        let recent_sales = recent_sales(&mut tx, DASHBOARD_PANEL_SIZE).await?;
        let recent_expenses = recent_expenses(&mut tx, DASHBOARD_PANEL_SIZE).await?;
        let top_items = top_items(&mut tx, DASHBOARD_PANEL_SIZE).await?;
        let breakdown = expense_breakdown(&mut tx, DASHBOARD_PANEL_SIZE).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(
            revenue = %totals.revenue,
            transactions = totals.transactions,
            expenses = %totals.expenses,
            "Dashboard aggregated"
        );

        Ok(Dashboard::new(
            totals,
            recent_sales,
            recent_expenses,
            top_items,
            breakdown,
        ))
    }

    /// Revenue per calendar month for up to `months` most recent months
    /// that have sales, most recent first.
    pub async fn monthly_revenue(&self, months: u32) -> DbResult<Vec<MonthlyRevenue>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT strftime('%Y-%m', date) AS month,
                   SUM(total_cents) AS revenue_cents
            FROM sales
            GROUP BY month
            ORDER BY month DESC
            LIMIT ?1
            "#,
        )
        .bind(months)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(month, cents)| MonthlyRevenue::new(month, Money::from_cents(cents)))
            .collect())
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn totals(conn: &mut SqliteConnection) -> DbResult<Totals> {
    let (revenue, transactions): (i64, i64) =
        sqlx::query_as("SELECT COALESCE(SUM(total_cents), 0), COUNT(*) FROM sales")
            .fetch_one(&mut *conn)
            .await?;

    let expenses: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount_cents), 0) FROM expenses")
        .fetch_one(&mut *conn)
        .await?;

    Ok(Totals {
        revenue: Money::from_cents(revenue),
        transactions,
        expenses: Money::from_cents(expenses),
    })
}

async fn recent_sales(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<Sale>> {
    let sales = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, customer_name, date, total_cents, notes, created_at
        FROM sales
        ORDER BY date DESC, id DESC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

async fn recent_expenses(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<Expense>> {
    let expenses = sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, description, amount_cents, category, date, notes, created_at
        FROM expenses
        ORDER BY date DESC, id DESC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(expenses)
}

async fn top_items(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<TopItem>> {
    let rows: Vec<(String, Option<i64>, i64, i64)> = sqlx::query_as(
        r#"
        SELECT si.item_name,
               i.id,
               SUM(si.quantity) AS total_quantity,
               SUM(si.subtotal_cents) AS sales_cents
        FROM sale_items si
        LEFT JOIN items i ON si.item_name = i.name
        GROUP BY si.item_name
        ORDER BY total_quantity DESC, si.item_name ASC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(item_name, item_id, quantity, cents)| TopItem {
            item_name,
            item_id,
            quantity,
            sales: Money::from_cents(cents),
        })
        .collect())
}

async fn expense_breakdown(
    conn: &mut SqliteConnection,
    limit: u32,
) -> DbResult<Vec<CategoryTotal>> {
    let rows: Vec<(String, i64, Option<String>)> = sqlx::query_as(
        r#"
        SELECT category,
               SUM(amount_cents) AS total_cents,
               GROUP_CONCAT(id) AS expense_ids
        FROM expenses
        GROUP BY category
        ORDER BY total_cents DESC, category ASC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(category, cents, ids)| CategoryTotal {
            category,
            total: Money::from_cents(cents),
            expense_ids: parse_id_list(ids.as_deref().unwrap_or_default()),
        })
        .collect())
}

/// Parses SQLite's `GROUP_CONCAT` output (`"3,7,9"`), sorted ascending.
fn parse_id_list(raw: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    ids.sort_unstable();
    ids
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tally_core::{ExpenseDraft, LineSelection, SaleHeader};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded() -> (Database, HashMap<String, i64>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ids = db
            .items()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| (item.name, item.id))
            .collect();
        (db, ids)
    }

    async fn sell(db: &Database, customer: &str, on: NaiveDate, lines: &[(i64, i64)]) {
        let header = SaleHeader {
            customer_name: customer.to_string(),
            date: on,
            notes: None,
        };
        let selections: Vec<LineSelection> = lines
            .iter()
            .map(|(id, qty)| LineSelection::new(*id, *qty))
            .collect();
        db.sales().create(&header, &selections).await.unwrap();
    }

    async fn spend(db: &Database, description: &str, cents: i64, category: &str, on: NaiveDate) {
        db.expenses()
            .insert(&ExpenseDraft {
                description: description.to_string(),
                amount: Money::from_cents(cents),
                category: category.to_string(),
                date: on,
                notes: None,
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("9,3,7"), vec![3, 7, 9]);
        assert_eq!(parse_id_list(""), Vec::<i64>::new());
    }

    #[tokio::test]
    async fn test_empty_dashboard_is_all_zero() {
        let (db, _) = seeded().await;

        let dashboard = db.reports().dashboard().await.unwrap();

        assert_eq!(dashboard.revenue, Money::zero());
        assert_eq!(dashboard.transactions, 0);
        assert_eq!(dashboard.expenses, Money::zero());
        assert_eq!(dashboard.net_profit, Money::zero());
        assert!(dashboard.recent_sales.is_empty());
        assert!(dashboard.recent_expenses.is_empty());
        assert!(dashboard.top_items.is_empty());
        assert!(dashboard.expense_breakdown.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_totals_and_panels() {
        let (db, ids) = seeded().await;
        let white = ids["White Springtail"];
        let agnara = ids["Agnara"];
        let orange = ids["Orange Springtail"];

        sell(&db, "Ann", date(2024, 1, 15), &[(white, 2)]).await;
        sell(&db, "Ben", date(2024, 1, 16), &[(agnara, 3), (white, 1)]).await;
        sell(&db, "Cat", date(2024, 1, 16), &[(orange, 1)]).await;

        spend(&db, "Crickets", 3000, "Feed", date(2024, 1, 2)).await;
        spend(&db, "Flakes", 2000, "Feed", date(2024, 1, 3)).await;
        spend(&db, "Shelf", 9000, "Equipment", date(2024, 1, 4)).await;

        let dashboard = db.reports().dashboard().await.unwrap();

        // 240 + 480 + 250
        assert_eq!(dashboard.revenue.cents(), 97_000);
        assert_eq!(dashboard.transactions, 3);
        assert_eq!(dashboard.expenses.cents(), 14_000);
        assert_eq!(dashboard.net_profit.cents(), 83_000);

        // Same date: higher id first
        let recent: Vec<&str> = dashboard
            .recent_sales
            .iter()
            .map(|s| s.customer_name.as_str())
            .collect();
        assert_eq!(recent, vec!["Cat", "Ben", "Ann"]);
        assert_eq!(dashboard.recent_expenses[0].description, "Shelf");

        // White 3, Agnara 3 (tie broken by name), Orange 1
        let top: Vec<(&str, i64)> = dashboard
            .top_items
            .iter()
            .map(|t| (t.item_name.as_str(), t.quantity))
            .collect();
        assert_eq!(
            top,
            vec![("Agnara", 3), ("White Springtail", 3), ("Orange Springtail", 1)]
        );
        assert_eq!(dashboard.top_items[0].item_id, Some(agnara));
        assert_eq!(dashboard.top_items[1].sales.cents(), 36_000);

        let breakdown: Vec<(&str, i64, usize)> = dashboard
            .expense_breakdown
            .iter()
            .map(|c| (c.category.as_str(), c.total.cents(), c.expense_ids.len()))
            .collect();
        assert_eq!(breakdown, vec![("Equipment", 9000, 1), ("Feed", 5000, 2)]);
    }

    #[tokio::test]
    async fn test_top_item_without_catalog_entry_has_no_id() {
        let (db, ids) = seeded().await;
        let agnara = ids["Agnara"];

        sell(&db, "Ann", date(2024, 1, 15), &[(agnara, 1)]).await;
        db.items()
            .update(agnara, "Agnara (renamed)", Money::from_cents(12_000))
            .await
            .unwrap();

        let dashboard = db.reports().dashboard().await.unwrap();
        assert_eq!(dashboard.top_items[0].item_name, "Agnara");
        assert_eq!(dashboard.top_items[0].item_id, None);
    }

    #[tokio::test]
    async fn test_panels_are_capped() {
        let (db, ids) = seeded().await;
        let white = ids["White Springtail"];

        for day in 1..=7 {
            sell(&db, &format!("Customer {day}"), date(2024, 3, day), &[(white, 1)]).await;
            spend(&db, "Misc", 100, &format!("Cat {day}"), date(2024, 3, day)).await;
        }

        let dashboard = db.reports().dashboard().await.unwrap();
        assert_eq!(dashboard.transactions, 7);
        assert_eq!(dashboard.recent_sales.len(), DASHBOARD_PANEL_SIZE as usize);
        assert_eq!(dashboard.recent_sales[0].customer_name, "Customer 7");
        assert_eq!(dashboard.recent_expenses.len(), DASHBOARD_PANEL_SIZE as usize);
        assert_eq!(dashboard.expense_breakdown.len(), DASHBOARD_PANEL_SIZE as usize);
    }

    #[tokio::test]
    async fn test_monthly_revenue_most_recent_first() {
        let (db, ids) = seeded().await;
        let white = ids["White Springtail"];
        let agnara = ids["Agnara"];

        sell(&db, "Ann", date(2024, 1, 15), &[(white, 2)]).await;
        sell(&db, "Ben", date(2024, 1, 20), &[(agnara, 1)]).await;
        sell(&db, "Cat", date(2024, 2, 3), &[(white, 1)]).await;

        let stats = db.reports().monthly_revenue(12).await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].month, "2024-02");
        assert_eq!(stats[0].revenue_cents, 12_000);
        assert_eq!(stats[1].month, "2024-01");
        assert_eq!(stats[1].revenue_cents, 36_000);
        assert!((stats[1].revenue - 360.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_monthly_revenue_respects_limit() {
        let (db, ids) = seeded().await;
        let white = ids["White Springtail"];

        for month in 1..=4 {
            sell(&db, "Ann", date(2023, month, 1), &[(white, 1)]).await;
        }

        let stats = db.reports().monthly_revenue(3).await.unwrap();
        let months: Vec<&str> = stats.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-04", "2023-03", "2023-02"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dashboard_panels_agree_during_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("sales.db")))
            .await
            .unwrap();
        let white = db
            .items()
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|item| item.name == "White Springtail")
            .unwrap()
            .id;

        let writer = {
            let db = db.clone();
            tokio::spawn(async move {
                for n in 0..30 {
                    sell(&db, &format!("Customer {n}"), date(2024, 1, 15), &[(white, 1)]).await;
                }
            })
        };

        // One item sold: its top-items row must match revenue exactly
        for _ in 0..30 {
            let dashboard = db.reports().dashboard().await.unwrap();
            let top_sales = dashboard
                .top_items
                .first()
                .map(|item| item.sales)
                .unwrap_or_default();
            assert_eq!(top_sales, dashboard.revenue);
            assert_eq!(dashboard.revenue.cents(), dashboard.transactions * 12_000);
        }

        writer.await.unwrap();
        let dashboard = db.reports().dashboard().await.unwrap();
        assert_eq!(dashboard.transactions, 30);
        db.close().await;
    }
}
