//! # Stock Movement Repository
//!
//! Database operations for the append-only movement audit trail.
//!
//! ## Append-only Contract
//! Movements are inserted once, inside the coordinator's transaction, and
//! never updated or deleted. There is deliberately no `update` or `delete`
//! method here. Reads need no locking: rows are immutable, so concurrent
//! historical queries are always safe.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tally_core::{SourceType, StockMovement};

/// Repository for stock movement rows.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Gets all movements committed for one business document, in applied
    /// order.
    ///
    /// ## Usage
    /// The revert handler reads back what a document actually committed
    /// (quantities as applied, not as currently displayed) before building
    /// the compensating batch.
    pub async fn for_source(
        &self,
        source_type: SourceType,
        source_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, outlet_id, source_type, source_id,
                   quantity_in, quantity_out, balance_after, occurred_at
            FROM stock_movements
            WHERE source_type = ?1 AND source_id = ?2
            ORDER BY occurred_at, id
            "#,
        )
        .bind(source_type)
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Gets the most recent movements for a (product, outlet) pair,
    /// newest first.
    pub async fn history(
        &self,
        product_id: &str,
        outlet_id: &str,
        limit: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, outlet_id, source_type, source_id,
                   quantity_in, quantity_out, balance_after, occurred_at
            FROM stock_movements
            WHERE product_id = ?1 AND outlet_id = ?2
            ORDER BY occurred_at DESC, id DESC
            LIMIT ?3
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Replays the full trail for a pair: `SUM(quantity_in - quantity_out)`.
    ///
    /// Reconciliation property: this must equal the pair's current
    /// `quantity_on_hand` at every point in time.
    pub async fn reconciled_balance(&self, product_id: &str, outlet_id: &str) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity_in - quantity_out), 0)
            FROM stock_movements
            WHERE product_id = ?1 AND outlet_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(outlet_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    // =========================================================================
    // Transaction-scoped access (coordinator only)
    // =========================================================================

    /// Appends one immutable movement row on the caller's transaction
    /// connection.
    ///
    /// If this insert fails the enclosing transaction fails with it, so a
    /// quantity change without its audit record (or vice versa) is never
    /// observable.
    pub(crate) async fn append_on(
        conn: &mut SqliteConnection,
        movement: &StockMovement,
    ) -> DbResult<()> {
        debug!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            outlet_id = %movement.outlet_id,
            source_type = %movement.source_type,
            source_id = %movement.source_id,
            "Appending stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, outlet_id, source_type, source_id,
                quantity_in, quantity_out, balance_after, occurred_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(&movement.outlet_id)
        .bind(movement.source_type)
        .bind(&movement.source_id)
        .bind(movement.quantity_in)
        .bind(movement.quantity_out)
        .bind(movement.balance_after)
        .bind(movement.occurred_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
