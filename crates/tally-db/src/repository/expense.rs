//! # Expense Repository
//!
//! Database operations for expenses.
//!
//! Expenses are standalone rows; categories are free text and are matched
//! with exact string equality when grouping or bulk deleting.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{Expense, ExpenseDraft, Money};

const EXPENSE_COLUMNS: &str = "id, description, amount_cents, category, date, notes, created_at";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses whose description or category contains `term`.
    ///
    /// Newest first (`date DESC, id DESC`). An empty term lists everything.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Expense>> {
        debug!(term = %term, "Searching expenses");

        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE description LIKE '%' || ?1 || '%'
               OR category LIKE '%' || ?1 || '%'
            ORDER BY date DESC, id DESC
            "#
        ))
        .bind(term)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Sum of all expense amounts; zero when there are none.
    pub async fn total(&self) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount_cents), 0) FROM expenses")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_cents(cents))
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Inserts an expense and returns the stored row.
    pub async fn insert(&self, draft: &ExpenseDraft) -> DbResult<Expense> {
        debug!(
            description = %draft.description,
            category = %draft.category,
            amount = %draft.amount,
            "Inserting expense"
        );

        let id = sqlx::query(
            r#"
            INSERT INTO expenses (description, amount_cents, category, date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&draft.description)
        .bind(draft.amount)
        .bind(&draft.category)
        .bind(draft.date)
        .bind(draft.notes.as_deref())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Expense", id))
    }

    /// Overwrites an expense's fields.
    ///
    /// ## Returns
    /// * `Ok(true)` - Expense updated
    /// * `Ok(false)` - No expense with this id
    pub async fn update(&self, id: i64, draft: &ExpenseDraft) -> DbResult<bool> {
        debug!(id, category = %draft.category, amount = %draft.amount, "Updating expense");

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                description = ?2,
                amount_cents = ?3,
                category = ?4,
                date = ?5,
                notes = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.description)
        .bind(draft.amount)
        .bind(&draft.category)
        .bind(draft.date)
        .bind(draft.notes.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an expense. A missing id is a no-op (`false`).
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, deleted = result.rows_affected(), "Deleted expense");
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every expense whose category equals `category` exactly.
    ///
    /// Returns the number of rows removed.
    pub async fn delete_category(&self, category: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM expenses WHERE category = ?1")
            .bind(category)
            .execute(&self.pool)
            .await?;

        debug!(category = %category, deleted = result.rows_affected(), "Deleted expense category");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
