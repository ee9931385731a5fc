//! # Mutation Coordinator
//!
//! Applies a delta batch against the ledger as one atomic unit of work.
//!
//! ## Batch Application
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     One Transaction Per Batch                       │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    for each delta, in line-item submission order:                   │
//! │      1. SELECT current level (same connection, same snapshot)       │
//! │         └── missing? policy per source type: zero | LevelNotFound   │
//! │      2. new_quantity = quantity_on_hand + delta                     │
//! │      3. new_quantity < 0 ──► InsufficientStock, whole batch aborts  │
//! │      4. UPSERT level, then INSERT movement                          │
//! │         (balance_after = the just-computed new_quantity;            │
//! │          NEVER re-read after the write)                             │
//! │  COMMIT ── or any failure drops the transaction ──► ROLLBACK        │
//! │                                                                     │
//! │  Result: either every level write and every movement of the batch   │
//! │  is visible, or none of them is.                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Two batches on disjoint (product, outlet) pairs commit independently.
//! Batches touching the same pair are serialized by SQLite's writer lock;
//! losing out past the busy timeout (or hitting a stale WAL snapshot)
//! surfaces as [`DbError::Conflict`], which the caller may retry with the
//! same source document id. The coordinator holds no state between calls
//! and never auto-retries.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use sqlx::SqlitePool;

use crate::error::DbError;
use crate::repository::level::LevelRepository;
use crate::repository::movement::MovementRepository;
use tally_core::{derive_movement, DeltaBatch, LedgerError, LevelPolicy, StockMovement};

// =============================================================================
// Apply Error
// =============================================================================

/// Everything that can stop a delta batch from committing.
///
/// Business-rule failures and storage failures propagate unchanged to the
/// operation handlers; the business-document layer maps them onto its own
/// error shape (e.g., HTTP 400 for insufficient stock, 409 for conflicts).
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Batch validation or business-rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failure, including retryable concurrent conflicts.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ApplyError {
    /// Whether re-submitting the same batch may succeed.
    ///
    /// True only for transient storage conflicts. Business-rule rejections
    /// are deterministic and not worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApplyError::Ledger(_) => false,
            ApplyError::Db(e) => e.is_retryable(),
        }
    }
}

/// Result type for batch application.
pub type ApplyResult<T> = Result<T, ApplyError>;

// =============================================================================
// Ledger (Mutation Coordinator)
// =============================================================================

/// The single write path for stock quantities.
///
/// Single-shot transform: pending batch → committed | aborted. No retained
/// state between calls.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Creates a new coordinator on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }

    /// Applies every delta of the batch, all-or-nothing.
    ///
    /// ## Returns
    /// * `Ok(movements)` - One committed movement per delta, in batch order
    /// * `Err(ApplyError)` - Nothing from this batch is observable
    ///
    /// ## Blocking
    /// May wait (bounded by the configured busy timeout) on another writer
    /// touching the same rows. Callers should treat this as a
    /// bounded-latency blocking call. Cancellation drops the transaction,
    /// which rolls it back — zero partial effect.
    pub async fn apply_batch(&self, batch: &DeltaBatch) -> ApplyResult<Vec<StockMovement>> {
        let source_type = batch.source_type();
        let policy = source_type.level_policy();
        let now = Utc::now();

        debug!(
            source_type = %source_type,
            source_id = %batch.source_id(),
            items = batch.len(),
            "Applying delta batch"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let mut movements = Vec::with_capacity(batch.len());

        for delta in batch.deltas() {
            let current =
                LevelRepository::get_on(&mut tx, &delta.product_id, &delta.outlet_id).await?;

            let on_hand = match (&current, policy) {
                (Some(level), _) => level.quantity_on_hand,
                (None, LevelPolicy::CreateIfMissing) => 0,
                (None, LevelPolicy::RequireExisting) => {
                    return Err(LedgerError::LevelNotFound {
                        product_id: delta.product_id.clone(),
                        outlet_id: delta.outlet_id.clone(),
                    }
                    .into());
                }
            };

            let new_quantity = on_hand + delta.delta;
            if new_quantity < 0 {
                // Dropping `tx` rolls back writes from earlier deltas too.
                return Err(LedgerError::InsufficientStock {
                    product_id: delta.product_id.clone(),
                    outlet_id: delta.outlet_id.clone(),
                    requested: -delta.delta,
                    available: on_hand,
                }
                .into());
            }

            LevelRepository::upsert_on(
                &mut tx,
                &delta.product_id,
                &delta.outlet_id,
                new_quantity,
                now,
            )
            .await?;

            let movement = derive_movement(
                &delta.product_id,
                &delta.outlet_id,
                delta.delta,
                source_type,
                batch.source_id(),
                new_quantity,
                now,
            );
            MovementRepository::append_on(&mut tx, &movement).await?;
            movements.push(movement);
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            source_type = %source_type,
            source_id = %batch.source_id(),
            movements = movements.len(),
            "Delta batch committed"
        );

        Ok(movements)
    }
}
