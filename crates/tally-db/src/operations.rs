//! # Operation Handlers
//!
//! One entry point per business operation that touches stock. Each handler
//! translates a validated request into a delta batch (pure, in `tally-core`)
//! and drives the mutation coordinator; on success the committed movements
//! come back for the caller's records.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Business-document layer (out of scope)                             │
//! │      │ validated items (product, outlet, quantity)                  │
//! │      ▼                                                              │
//! │  Operations::record_sale("sale-42", items)                          │
//! │      │ DeltaBatch::sale(...)          ← pure, rejects bad shapes    │
//! │      ▼                                                              │
//! │  Ledger::apply_batch(batch)           ← one transaction             │
//! │      │                                                              │
//! │      ▼                                                              │
//! │  Vec<StockMovement>                   ← exactly one per line item   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting/voiding/cancelling a document re-enters the same path through
//! [`Operations::revert`], which inverts the document's *committed*
//! movements. Whether a document may be voided at all (e.g., a sale already
//! voided) is the caller's document-status concern.

use tracing::{debug, info};

use sqlx::SqlitePool;

use crate::ledger::{ApplyResult, Ledger};
use crate::repository::movement::MovementRepository;
use tally_core::{AdjustmentItem, DeltaBatch, LineItem, SourceType, StockMovement};

/// Business operation handlers over the mutation coordinator.
#[derive(Debug, Clone)]
pub struct Operations {
    ledger: Ledger,
    movements: MovementRepository,
}

impl Operations {
    /// Creates the handlers on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Operations {
            ledger: Ledger::new(pool.clone()),
            movements: MovementRepository::new(pool),
        }
    }

    /// Receives goods from a supplier: `+quantity` per item.
    ///
    /// Registers a product at an outlet on first receipt (level created at
    /// zero, then incremented).
    pub async fn receive_purchase(
        &self,
        purchase_id: &str,
        items: &[LineItem],
    ) -> ApplyResult<Vec<StockMovement>> {
        let batch = DeltaBatch::purchase(purchase_id, items)?;
        info!(purchase_id, items = items.len(), "Receiving purchase");
        self.ledger.apply_batch(&batch).await
    }

    /// Sells goods: `-quantity` per item.
    ///
    /// Fails with `LevelNotFound` for products never stocked at the outlet
    /// and `InsufficientStock` when on-hand stock cannot cover a line.
    pub async fn record_sale(
        &self,
        sale_id: &str,
        items: &[LineItem],
    ) -> ApplyResult<Vec<StockMovement>> {
        let batch = DeltaBatch::sale(sale_id, items)?;
        info!(sale_id, items = items.len(), "Recording sale");
        self.ledger.apply_batch(&batch).await
    }

    /// Accepts a customer return back into stock: `+quantity` per item.
    pub async fn return_to_stock(
        &self,
        return_id: &str,
        items: &[LineItem],
    ) -> ApplyResult<Vec<StockMovement>> {
        let batch = DeltaBatch::return_to_stock(return_id, items)?;
        info!(return_id, items = items.len(), "Returning to stock");
        self.ledger.apply_batch(&batch).await
    }

    /// Sends goods back to a supplier: `-quantity` per item.
    pub async fn return_to_supplier(
        &self,
        return_id: &str,
        items: &[LineItem],
    ) -> ApplyResult<Vec<StockMovement>> {
        let batch = DeltaBatch::return_to_supplier(return_id, items)?;
        info!(return_id, items = items.len(), "Returning to supplier");
        self.ledger.apply_batch(&batch).await
    }

    /// Applies a manual stock adjustment with explicit signed deltas
    /// (stocktake correction, damage, shrinkage).
    pub async fn adjust_stock(
        &self,
        adjustment_id: &str,
        items: &[AdjustmentItem],
    ) -> ApplyResult<Vec<StockMovement>> {
        let batch = DeltaBatch::adjustment(adjustment_id, items)?;
        info!(adjustment_id, items = items.len(), "Adjusting stock");
        self.ledger.apply_batch(&batch).await
    }

    /// Reverses a committed operation when its document is deleted, voided
    /// or cancelled.
    ///
    /// Reads back the movements the original operation committed - the
    /// quantities as applied, not as the document currently displays them -
    /// inverts their deltas and applies them as one batch tagged
    /// `<original>_revert` with the original `source_id`. The original
    /// movements are never touched.
    ///
    /// ## Errors
    /// * `NotRevertible` - `original` is itself a revert type
    /// * `NothingToRevert` - The document never committed any movements
    /// * `InsufficientStock` - Undoing an inbound operation after the goods
    ///   were already consumed (e.g., revert a purchase after selling part
    ///   of it)
    pub async fn revert(
        &self,
        original: SourceType,
        source_id: &str,
    ) -> ApplyResult<Vec<StockMovement>> {
        debug!(source_type = %original, source_id, "Reading back movements for revert");

        let recorded = self.movements.for_source(original, source_id).await?;
        let batch = DeltaBatch::revert_of(original, source_id, &recorded)?;

        info!(
            source_type = %original,
            source_id,
            movements = recorded.len(),
            "Reverting operation"
        );
        self.ledger.apply_batch(&batch).await
    }
}
