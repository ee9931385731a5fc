//! # Stock Level Repository
//!
//! Database operations for current stock per (product, outlet) pair.
//!
//! ## Write Discipline
//! `quantity_on_hand` has exactly one write path: [`LevelRepository::upsert_on`],
//! which is crate-private and runs on the mutation coordinator's transaction
//! connection. Everything public here is a read, except the advisory
//! `minimum_threshold` setter which never touches quantities.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::StockLevel;

/// Repository for stock level rows.
#[derive(Debug, Clone)]
pub struct LevelRepository {
    pool: SqlitePool,
}

impl LevelRepository {
    /// Creates a new LevelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LevelRepository { pool }
    }

    /// Gets the current level for a (product, outlet) pair.
    ///
    /// ## Returns
    /// * `Ok(Some(level))` - Pair has been written at least once
    /// * `Ok(None)` - Product never registered at this outlet
    pub async fn get(&self, product_id: &str, outlet_id: &str) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, outlet_id, quantity_on_hand, minimum_threshold,
                   created_at, updated_at
            FROM stock_levels
            WHERE product_id = ?1 AND outlet_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Lists all levels at an outlet, lowest stock first.
    pub async fn list_for_outlet(&self, outlet_id: &str) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, outlet_id, quantity_on_hand, minimum_threshold,
                   created_at, updated_at
            FROM stock_levels
            WHERE outlet_id = ?1
            ORDER BY quantity_on_hand ASC, product_id
            "#,
        )
        .bind(outlet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Lists levels at an outlet that have fallen to or below their advisory
    /// threshold (reorder report).
    pub async fn below_minimum(&self, outlet_id: &str) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, outlet_id, quantity_on_hand, minimum_threshold,
                   created_at, updated_at
            FROM stock_levels
            WHERE outlet_id = ?1
              AND minimum_threshold > 0
              AND quantity_on_hand <= minimum_threshold
            ORDER BY quantity_on_hand ASC, product_id
            "#,
        )
        .bind(outlet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Sets the advisory reorder threshold for an existing level.
    ///
    /// Does not change `quantity_on_hand` and is therefore allowed to bypass
    /// the coordinator.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No level row exists for the pair yet
    pub async fn set_minimum_threshold(
        &self,
        product_id: &str,
        outlet_id: &str,
        threshold: i64,
    ) -> DbResult<()> {
        debug!(product_id, outlet_id, threshold, "Setting minimum threshold");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_levels SET
                minimum_threshold = ?3,
                updated_at = ?4
            WHERE product_id = ?1 AND outlet_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .bind(threshold)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "StockLevel",
                format!("{product_id}@{outlet_id}"),
            ));
        }

        Ok(())
    }

    // =========================================================================
    // Transaction-scoped access (coordinator only)
    // =========================================================================

    /// Reads a level on the caller's transaction connection.
    ///
    /// The coordinator's read-decide-write sequence must see the same
    /// snapshot it writes into, so this never uses the pool.
    pub(crate) async fn get_on(
        conn: &mut SqliteConnection,
        product_id: &str,
        outlet_id: &str,
    ) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, outlet_id, quantity_on_hand, minimum_threshold,
                   created_at, updated_at
            FROM stock_levels
            WHERE product_id = ?1 AND outlet_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .fetch_optional(conn)
        .await?;

        Ok(level)
    }

    /// Writes the new quantity on the caller's transaction connection,
    /// creating the row on first write.
    ///
    /// Crate-private: the mutation coordinator is the only caller. The
    /// threshold is preserved on update and starts at 0 on insert.
    pub(crate) async fn upsert_on(
        conn: &mut SqliteConnection,
        product_id: &str,
        outlet_id: &str,
        new_quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(product_id, outlet_id, new_quantity, "Upserting stock level");

        sqlx::query(
            r#"
            INSERT INTO stock_levels (
                product_id, outlet_id, quantity_on_hand, minimum_threshold,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?4)
            ON CONFLICT (product_id, outlet_id) DO UPDATE SET
                quantity_on_hand = excluded.quantity_on_hand,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .bind(new_quantity)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }
}
