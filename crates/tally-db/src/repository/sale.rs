//! # Sale Repository
//!
//! Database operations for sales and their lines (`sale_items`).
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Write Paths                                  │
//! │                                                                         │
//! │  create(header, selections)                                            │
//! │     BEGIN IMMEDIATE                                                    │
//! │     ├── load active items                                              │
//! │     ├── tally_core::price_lines()  ── EmptySale ──► rollback           │
//! │     ├── INSERT sales (total = Σ subtotal)                              │
//! │     ├── INSERT sale_items × n  (name + price snapshots)                │
//! │     COMMIT                                                             │
//! │                                                                         │
//! │  replace(id, header, selections)                                       │
//! │     BEGIN IMMEDIATE ── price ── DELETE/INSERT lines ── UPDATE header   │
//! │     COMMIT                                                             │
//! │                                                                         │
//! │  remove_item_everywhere(name)                                          │
//! │     BEGIN IMMEDIATE                                                    │
//! │     ├── affected = DISTINCT sale_id WHERE item_name = name             │
//! │     ├── DELETE lines WHERE item_name = name                            │
//! │     ├── per affected sale: Σ remaining subtotals                       │
//! │     │      ├── NULL / 0 ──► DELETE sale                                │
//! │     │      └── n       ──► UPDATE total = n                            │
//! │     COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! After every committed write each sale's total equals the sum of its line
//! subtotals and each sale has at least one line.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use tally_core::{
    price_lines, Item, LineSelection, PricedLine, PricedSale, RemovalSummary, Sale, SaleHeader,
    SaleLine, SaleWithLines,
};

const SALE_COLUMNS: &str = "id, customer_name, date, total_cents, notes, created_at";

const LINE_COLUMNS: &str = "id, sale_id, item_name, quantity, price_cents, subtotal_cents";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Gets the lines of a sale, in insertion order.
    pub async fn get_lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let mut conn = self.pool.acquire().await?;
        fetch_lines(&mut conn, sale_id).await
    }

    /// Gets a sale together with its lines.
    pub async fn get_with_lines(&self, id: i64) -> DbResult<Option<SaleWithLines>> {
        let mut conn = self.pool.acquire().await?;

        let Some(sale) = fetch_sale(&mut conn, id).await? else {
            return Ok(None);
        };
        let lines = fetch_lines(&mut conn, id).await?;

        Ok(Some(SaleWithLines { sale, lines }))
    }

    /// Lists sales whose customer name contains `term`, newest first.
    ///
    /// An empty term lists every sale.
    pub async fn search(&self, term: &str) -> DbResult<Vec<SaleWithLines>> {
        debug!(term = %term, "Searching sales");

        let mut conn = self.pool.acquire().await?;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE customer_name LIKE '%' || ?1 || '%'
            ORDER BY date DESC, id DESC
            "#
        ))
        .bind(term)
        .fetch_all(&mut *conn)
        .await?;

        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM sale_items
            WHERE sale_id IN (
                SELECT id FROM sales WHERE customer_name LIKE '%' || ?1 || '%'
            )
            ORDER BY sale_id, id
            "#
        ))
        .bind(term)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_sale: HashMap<i64, Vec<SaleLine>> = HashMap::new();
        for line in lines {
            by_sale.entry(line.sale_id).or_default().push(line);
        }

        let results: Vec<SaleWithLines> = sales
            .into_iter()
            .map(|sale| {
                let lines = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithLines { sale, lines }
            })
            .collect();

        debug!(count = results.len(), "Search returned sales");
        Ok(results)
    }

    /// Creates a sale from a header and the form's line selections.
    ///
    /// ## Errors
    /// * `DbError::Rejected(CoreError::EmptySale)` - no selection priced to
    ///   a line; nothing was written
    pub async fn create(
        &self,
        header: &SaleHeader,
        selections: &[LineSelection],
    ) -> DbResult<SaleWithLines> {
        let mut tx = begin_write(&self.pool).await?;

        let priced = price_against_catalog(&mut tx, selections).await?;

        let sale_id = sqlx::query(
            r#"
            INSERT INTO sales (customer_name, date, total_cents, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&header.customer_name)
        .bind(header.date)
        .bind(priced.total)
        .bind(header.notes.as_deref())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        debug!(
            sale_id,
            customer = %header.customer_name,
            lines = priced.lines.len(),
            total = %priced.total,
            "Inserting sale"
        );

        insert_lines(&mut tx, sale_id, &priced.lines).await?;

        let sale = fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let lines = fetch_lines(&mut tx, sale_id).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(SaleWithLines { sale, lines })
    }

    /// Replaces a sale's header and full line set, recomputing the total.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no sale with this id
    /// * `DbError::Rejected(CoreError::EmptySale)` - nothing priced; the
    ///   stored sale is untouched
    pub async fn replace(
        &self,
        id: i64,
        header: &SaleHeader,
        selections: &[LineSelection],
    ) -> DbResult<SaleWithLines> {
        let mut tx = begin_write(&self.pool).await?;

        if fetch_sale(&mut tx, id).await?.is_none() {
            return Err(DbError::not_found("Sale", id));
        }

        let priced = price_against_catalog(&mut tx, selections).await?;

        let removed = sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        insert_lines(&mut tx, id, &priced.lines).await?;

        sqlx::query(
            r#"
            UPDATE sales SET
                customer_name = ?2,
                date = ?3,
                total_cents = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&header.customer_name)
        .bind(header.date)
        .bind(priced.total)
        .bind(header.notes.as_deref())
        .execute(&mut *tx)
        .await?;

        debug!(
            sale_id = id,
            lines_removed = removed,
            lines = priced.lines.len(),
            total = %priced.total,
            "Replaced sale"
        );

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        let lines = fetch_lines(&mut tx, id).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(SaleWithLines { sale, lines })
    }

    /// Deletes a sale and its lines. A missing id is a no-op (`false`).
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let mut tx = begin_write(&self.pool).await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(sale_id = id, deleted = result.rows_affected(), "Deleted sale");
        Ok(result.rows_affected() > 0)
    }

    /// Removes every line named `item_name` from every sale.
    ///
    /// Affected sales get their total recomputed; a sale left without lines
    /// (or with a zero total) is deleted.
    pub async fn remove_item_everywhere(&self, item_name: &str) -> DbResult<RemovalSummary> {
        let mut tx = begin_write(&self.pool).await?;

        let affected: Vec<i64> =
            sqlx::query_scalar("SELECT DISTINCT sale_id FROM sale_items WHERE item_name = ?1")
                .bind(item_name)
                .fetch_all(&mut *tx)
                .await?;

        let mut summary = RemovalSummary {
            lines_removed: sqlx::query("DELETE FROM sale_items WHERE item_name = ?1")
                .bind(item_name)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
            ..RemovalSummary::default()
        };

        for sale_id in affected {
            let remaining: Option<i64> =
                sqlx::query_scalar("SELECT SUM(subtotal_cents) FROM sale_items WHERE sale_id = ?1")
                    .bind(sale_id)
                    .fetch_one(&mut *tx)
                    .await?;

            match remaining {
                Some(total) if total > 0 => {
                    sqlx::query("UPDATE sales SET total_cents = ?2 WHERE id = ?1")
                        .bind(sale_id)
                        .bind(total)
                        .execute(&mut *tx)
                        .await?;
                    summary.sales_updated += 1;
                }
                _ => {
                    // Zero-priced leftovers go with the sale
                    sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
                        .bind(sale_id)
                        .execute(&mut *tx)
                        .await?;
                    sqlx::query("DELETE FROM sales WHERE id = ?1")
                        .bind(sale_id)
                        .execute(&mut *tx)
                        .await?;
                    summary.sales_deleted += 1;
                }
            }
        }

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(
            item = %item_name,
            lines_removed = summary.lines_removed,
            sales_updated = summary.sales_updated,
            sales_deleted = summary.sales_deleted,
            "Removed item from all sales"
        );
        Ok(summary)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

async fn fetch_sale(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

async fn fetch_lines(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Vec<SaleLine>> {
    let lines = sqlx::query_as::<_, SaleLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id"
    ))
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

/// Prices selections against the active catalog as seen by `conn`.
async fn price_against_catalog(
    conn: &mut SqliteConnection,
    selections: &[LineSelection],
) -> DbResult<PricedSale> {
    let catalog = sqlx::query_as::<_, Item>(
        "SELECT id, name, price_cents, active FROM items WHERE active = 1",
    )
    .fetch_all(&mut *conn)
    .await?;

    let priced = price_lines(selections, |id| catalog.iter().find(|item| item.id == id))?;
    Ok(priced)
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    sale_id: i64,
    lines: &[PricedLine],
) -> DbResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, item_name, quantity, price_cents, subtotal_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(sale_id)
        .bind(&line.item_name)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.subtotal)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use tally_core::{CoreError, Money};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn header(customer: &str, on: NaiveDate) -> SaleHeader {
        SaleHeader {
            customer_name: customer.to_string(),
            date: on,
            notes: None,
        }
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

    async fn line_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn assert_totals_consistent(db: &Database) {
        for sale in db.sales().search("").await.unwrap() {
            assert!(!sale.lines.is_empty(), "sale {} has no lines", sale.sale.id);
            assert_eq!(sale.sale.total, sale.lines_total());
            for line in &sale.lines {
                assert!(line.quantity > 0);
                assert_eq!(line.subtotal, line.price * line.quantity);
            }
        }
    }

    #[tokio::test]
    async fn test_create_prices_at_current_catalog_price() {
        let (db, ids) = seeded().await;

        let created = db
            .sales()
            .create(
                &header("Ann", date(2024, 1, 15)),
                &[LineSelection::new(ids["White Springtail"], 2)],
            )
            .await
            .unwrap();

        assert_eq!(created.sale.customer_name, "Ann");
        assert_eq!(created.sale.total.to_string(), "240.00");
        assert_eq!(created.lines.len(), 1);

        let line = &created.lines[0];
        assert_eq!(line.item_name, "White Springtail");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price.to_string(), "120.00");
        assert_eq!(line.subtotal.to_string(), "240.00");

        let stored = db.sales().get_with_lines(created.sale.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_create_skips_bad_selections() {
        let (db, ids) = seeded().await;
        let agnara = ids["Agnara"];
        db.items().toggle_active(ids["Orange Springtail"]).await.unwrap();

        let created = db
            .sales()
            .create(
                &header("Ben", date(2024, 2, 1)),
                &[
                    LineSelection::new(agnara, 1),
                    LineSelection::new(agnara, 0),
                    LineSelection::new(ids["Orange Springtail"], 3),
                    LineSelection::new(9999, 1),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.lines.len(), 1);
        assert_eq!(created.sale.total.cents(), 12_000);
    }

    #[tokio::test]
    async fn test_create_with_no_valid_lines_writes_nothing() {
        let (db, ids) = seeded().await;

        let err = db
            .sales()
            .create(
                &header("Cat", date(2024, 1, 1)),
                &[LineSelection::new(ids["Agnara"], 0), LineSelection::new(404, 2)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rejected(CoreError::EmptySale)));
        assert!(db.sales().search("").await.unwrap().is_empty());
        assert_eq!(line_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_replace_recomputes_lines_and_total() {
        let (db, ids) = seeded().await;
        let sales = db.sales();

        let created = sales
            .create(
                &header("Ann", date(2024, 1, 15)),
                &[LineSelection::new(ids["White Springtail"], 2)],
            )
            .await
            .unwrap();

        let mut new_header = header("Ann B.", date(2024, 1, 20));
        new_header.notes = Some("repriced".to_string());

        let replaced = sales
            .replace(
                created.sale.id,
                &new_header,
                &[
                    LineSelection::new(ids["Agnara"], 1),
                    LineSelection::new(ids["Porcellio Sevilla"], 2),
                ],
            )
            .await
            .unwrap();

        assert_eq!(replaced.sale.id, created.sale.id);
        assert_eq!(replaced.sale.customer_name, "Ann B.");
        assert_eq!(replaced.sale.date, date(2024, 1, 20));
        assert_eq!(replaced.sale.notes.as_deref(), Some("repriced"));
        assert_eq!(replaced.sale.total.cents(), 12_000 + 2 * 25_000);
        assert_eq!(replaced.lines.len(), 2);
        assert_eq!(line_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_replace_with_empty_selection_keeps_sale() {
        let (db, ids) = seeded().await;
        let sales = db.sales();

        let created = sales
            .create(
                &header("Ann", date(2024, 1, 15)),
                &[LineSelection::new(ids["Agnara"], 1)],
            )
            .await
            .unwrap();

        let err = sales
            .replace(created.sale.id, &header("Zed", date(2024, 3, 3)), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::EmptySale)));

        let stored = sales.get_with_lines(created.sale.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_replace_missing_sale_is_not_found() {
        let (db, ids) = seeded().await;

        let err = db
            .sales()
            .replace(
                42,
                &header("Nobody", date(2024, 1, 1)),
                &[LineSelection::new(ids["Agnara"], 1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (db, ids) = seeded().await;
        let sales = db.sales();

        let created = sales
            .create(
                &header("Ann", date(2024, 1, 15)),
                &[LineSelection::new(ids["Agnara"], 1)],
            )
            .await
            .unwrap();

        assert!(sales.delete(created.sale.id).await.unwrap());
        assert!(!sales.delete(created.sale.id).await.unwrap());
        assert!(sales.get_by_id(created.sale.id).await.unwrap().is_none());
        assert_eq!(line_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_search_matches_customer_substring() {
        let (db, ids) = seeded().await;
        let sales = db.sales();
        let one = [LineSelection::new(ids["Agnara"], 1)];

        sales.create(&header("Annabel", date(2024, 1, 1)), &one).await.unwrap();
        sales.create(&header("Bob", date(2024, 1, 3)), &one).await.unwrap();
        sales.create(&header("Joanna", date(2024, 1, 2)), &one).await.unwrap();

        let names: Vec<String> = sales
            .search("nna")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.sale.customer_name)
            .collect();
        assert_eq!(names, vec!["Joanna", "Annabel"]);

        let all = sales.search("").await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].sale.customer_name, "Bob");
        assert!(all.iter().all(|s| s.lines.len() == 1));
    }

    #[tokio::test]
    async fn test_remove_item_everywhere() {
        let (db, ids) = seeded().await;
        let sales = db.sales();
        let white = ids["White Springtail"];
        let agnara = ids["Agnara"];

        // Only the removed item: sale disappears
        let only = sales
            .create(&header("Ann", date(2024, 1, 1)), &[LineSelection::new(white, 1)])
            .await
            .unwrap();
        // Mixed: total drops to the Agnara line
        let mixed = sales
            .create(
                &header("Ben", date(2024, 1, 2)),
                &[LineSelection::new(white, 2), LineSelection::new(agnara, 1)],
            )
            .await
            .unwrap();
        // Untouched
        let other = sales
            .create(&header("Cat", date(2024, 1, 3)), &[LineSelection::new(agnara, 3)])
            .await
            .unwrap();

        let summary = sales.remove_item_everywhere("White Springtail").await.unwrap();
        assert_eq!(
            summary,
            RemovalSummary {
                lines_removed: 2,
                sales_updated: 1,
                sales_deleted: 1,
            }
        );

        assert!(sales.get_by_id(only.sale.id).await.unwrap().is_none());

        let mixed = sales.get_with_lines(mixed.sale.id).await.unwrap().unwrap();
        assert_eq!(mixed.sale.total, Money::from_cents(12_000));
        assert_eq!(mixed.lines.len(), 1);

        let other_after = sales.get_with_lines(other.sale.id).await.unwrap().unwrap();
        assert_eq!(other_after, other);

        assert_totals_consistent(&db).await;
    }

    #[tokio::test]
    async fn test_remove_unknown_item_changes_nothing() {
        let (db, ids) = seeded().await;

        db.sales()
            .create(
                &header("Ann", date(2024, 1, 1)),
                &[LineSelection::new(ids["Agnara"], 1)],
            )
            .await
            .unwrap();

        let summary = db.sales().remove_item_everywhere("Nothing").await.unwrap();
        assert_eq!(summary, RemovalSummary::default());
        assert_eq!(line_count(&db).await, 1);
    }
}
