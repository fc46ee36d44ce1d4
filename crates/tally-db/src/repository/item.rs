//! # Item Repository
//!
//! Database operations for the item catalog.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Soft vs Hard Delete                                  │
//! │                                                                         │
//! │  remove(id)                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  SELECT name FROM items WHERE id = ?        ── none ──► NotFound       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT COUNT(*) FROM sale_items WHERE item_name = ?                   │
//! │       │                                                                 │
//! │       ├── > 0 ──► UPDATE items SET active = 0   ──► Deactivated        │
//! │       └── = 0 ──► DELETE FROM items             ──► Deleted            │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale lines reference items by name snapshot only, so a referenced item is
//! kept around (inactive) to let the dashboard resolve it.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use tally_core::{Item, ItemRemoval, Money};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.insert("Agnara", Money::from_cents(12_000)).await?;
/// let picker = repo.list_active().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists every item, active or not, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, price_cents, active
            FROM items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists active items ordered by name (the sale form picker).
    pub async fn list_active(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, price_cents, active
            FROM items
            WHERE active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, price_cents, active
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new active item.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - an item with this name already exists
    pub async fn insert(&self, name: &str, price: Money) -> DbResult<Item> {
        debug!(name = %name, price = %price, "Inserting item");

        let result = sqlx::query(
            r#"
            INSERT INTO items (name, price_cents, active)
            VALUES (?1, ?2, 1)
            "#,
        )
        .bind(name)
        .bind(price)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(name))?;

        Ok(Item {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            price,
            active: true,
        })
    }

    /// Updates an item's name and price.
    ///
    /// ## Returns
    /// * `Ok(true)` - Item updated
    /// * `Ok(false)` - No item with this id (no-op)
    pub async fn update(&self, id: i64, name: &str, price: Money) -> DbResult<bool> {
        debug!(id, name = %name, price = %price, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                price_cents = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(name))?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips an item's `active` flag. A missing id is a no-op (`false`).
    pub async fn toggle_active(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Toggling item");

        let result = sqlx::query("UPDATE items SET active = 1 - active WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an item, softly if any sale line still carries its name.
    pub async fn remove(&self, id: i64) -> DbResult<ItemRemoval> {
        let mut tx = begin_write(&self.pool).await?;

        let name: Option<String> = sqlx::query_scalar("SELECT name FROM items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(name) = name else {
            debug!(id, "Item to remove not found");
            return Ok(ItemRemoval::NotFound);
        };

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE item_name = ?1")
                .bind(&name)
                .fetch_one(&mut *tx)
                .await?;

        let outcome = if references > 0 {
            sqlx::query("UPDATE items SET active = 0 WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            ItemRemoval::Deactivated
        } else {
            sqlx::query("DELETE FROM items WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            ItemRemoval::Deleted
        };

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id, name = %name, references, outcome = ?outcome, "Item removed");
        Ok(outcome)
    }

    /// Inserts `defaults` if, and only if, the catalog is empty.
    ///
    /// Runs in one transaction. Returns the number of rows inserted.
    pub async fn seed_defaults(&self, defaults: &[(&str, i64)]) -> DbResult<usize> {
        let mut tx = begin_write(&self.pool).await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *tx)
            .await?;

        if existing > 0 {
            debug!(existing, "Catalog not empty, skipping seed");
            return Ok(0);
        }

        for (name, price_cents) in defaults {
            sqlx::query("INSERT INTO items (name, price_cents, active) VALUES (?1, ?2, 1)")
                .bind(*name)
                .bind(*price_cents)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::from(e).with_duplicate_value(name))?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(defaults.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use tally_core::{ItemRemoval, LineSelection, Money, SaleHeader};

    use crate::error::DbError;

    async fn empty_db() -> Database {
        Database::new(DbConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list_ordered_by_name() {
        let db = empty_db().await;
        let items = db.items();

        items.insert("Orange Springtail", Money::from_cents(25_000)).await.unwrap();
        let agnara = items.insert("Agnara", Money::from_cents(12_000)).await.unwrap();

        assert!(agnara.active);
        assert_eq!(agnara.price.to_string(), "120.00");

        let names: Vec<String> = items.list().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Agnara", "Orange Springtail"]);

        let fetched = items.get_by_id(agnara.id).await.unwrap().unwrap();
        assert_eq!(fetched, agnara);
        assert!(items.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let db = empty_db().await;
        let items = db.items();

        items.insert("Agnara", Money::from_cents(12_000)).await.unwrap();
        let err = items.insert("Agnara", Money::from_cents(1)).await.unwrap_err();

        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "Agnara"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_rename_onto_existing_name_fails() {
        let db = empty_db().await;
        let items = db.items();

        items.insert("Agnara", Money::from_cents(12_000)).await.unwrap();
        let other = items.insert("Isopod", Money::from_cents(500)).await.unwrap();

        let err = items.update(other.id, "Agnara", Money::from_cents(500)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        assert!(items.update(other.id, "Isopod XL", Money::from_cents(700)).await.unwrap());
        let updated = items.get_by_id(other.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Isopod XL");
        assert_eq!(updated.price.cents(), 700);

        // Missing id is a no-op
        assert!(!items.update(404, "Ghost", Money::zero()).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_flips_active() {
        let db = empty_db().await;
        let items = db.items();

        let item = items.insert("Agnara", Money::from_cents(12_000)).await.unwrap();

        assert!(items.toggle_active(item.id).await.unwrap());
        assert!(!items.get_by_id(item.id).await.unwrap().unwrap().active);
        assert!(items.list_active().await.unwrap().is_empty());

        assert!(items.toggle_active(item.id).await.unwrap());
        assert!(items.get_by_id(item.id).await.unwrap().unwrap().active);

        assert!(!items.toggle_active(404).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_unreferenced_item_hard_deletes() {
        let db = empty_db().await;
        let items = db.items();

        let item = items.insert("Agnara", Money::from_cents(12_000)).await.unwrap();

        assert_eq!(items.remove(item.id).await.unwrap(), ItemRemoval::Deleted);
        assert!(items.get_by_id(item.id).await.unwrap().is_none());
        assert_eq!(items.remove(item.id).await.unwrap(), ItemRemoval::NotFound);
    }

    #[tokio::test]
    async fn test_remove_referenced_item_soft_deletes() {
        let db = empty_db().await;
        let item = db.items().insert("Agnara", Money::from_cents(12_000)).await.unwrap();

        let header = SaleHeader {
            customer_name: "Ann".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            notes: None,
        };
        db.sales()
            .create(&header, &[LineSelection::new(item.id, 1)])
            .await
            .unwrap();

        assert_eq!(db.items().remove(item.id).await.unwrap(), ItemRemoval::Deactivated);

        let kept = db.items().get_by_id(item.id).await.unwrap().unwrap();
        assert!(!kept.active);
    }

    #[tokio::test]
    async fn test_seed_defaults_only_when_empty() {
        let db = empty_db().await;
        let items = db.items();

        let defaults = [("White Springtail", 12_000), ("Agnara", 12_000)];
        assert_eq!(items.seed_defaults(&defaults).await.unwrap(), 2);
        assert_eq!(items.seed_defaults(&defaults).await.unwrap(), 0);

        let all = items.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|i| i.active));
    }
}
