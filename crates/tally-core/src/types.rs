//! # Domain Types
//!
//! Core domain types for the inventory ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Ledger Types                               │
//! │                                                                     │
//! │  ┌──────────────────┐        ┌──────────────────────────┐          │
//! │  │    StockLevel    │        │      StockMovement       │          │
//! │  │  ──────────────  │        │  ──────────────────────  │          │
//! │  │  product_id      │ 1    * │  id (UUID)               │          │
//! │  │  outlet_id       │◄───────│  product_id / outlet_id  │          │
//! │  │  quantity_on_hand│        │  source_type / source_id │          │
//! │  │  minimum_thresh. │        │  quantity_in / _out      │          │
//! │  └──────────────────┘        │  balance_after           │          │
//! │     current state            │  occurred_at             │          │
//! │     (mutable, guarded)       └──────────────────────────┘          │
//! │                                 append-only audit trail            │
//! │                                                                     │
//! │  ┌──────────────────┐        ┌──────────────────────────┐          │
//! │  │    SourceType    │        │       LevelPolicy        │          │
//! │  │  purchase, sale, │───────►│  CreateIfMissing         │          │
//! │  │  returns, adjust │        │  RequireExisting         │          │
//! │  │  + *_revert      │        └──────────────────────────┘          │
//! │  └──────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Contract
//! - `StockLevel.quantity_on_hand` is never negative after a commit.
//! - Replaying all movements for a (product, outlet) pair in order and
//!   summing `quantity_in - quantity_out` from 0 reproduces the level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Source Type
// =============================================================================

/// The business operation that caused a stock movement.
///
/// Every movement is tagged with the operation that produced it plus the id
/// of the originating document (`source_id`), so the audit trail can always
/// answer "why did this quantity change".
///
/// The `*Revert` variants tag compensating movements written when a document
/// is deleted, voided or cancelled. They reference the *original* document's
/// id; the original movements are never edited or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Goods received from a supplier.
    Purchase,
    /// Goods sold to a customer.
    Sale,
    /// Customer return accepted back into stock.
    ReturnToStock,
    /// Goods sent back to a supplier.
    ReturnToSupplier,
    /// Manual correction (stocktake, damage, shrinkage).
    StockAdjustment,
    /// Compensation for a deleted/cancelled purchase.
    PurchaseRevert,
    /// Compensation for a voided sale.
    SaleRevert,
    /// Compensation for a deleted customer return.
    ReturnToStockRevert,
    /// Compensation for a deleted supplier return.
    ReturnToSupplierRevert,
    /// Compensation for a deleted manual adjustment.
    AdjustmentRevert,
}

impl SourceType {
    /// Returns the compensating source type for this operation.
    ///
    /// ## Returns
    /// * `Some(revert)` - For original operations
    /// * `None` - Reverts cannot themselves be reverted; undoing a revert is
    ///   modelled as re-applying the original operation upstream
    pub fn revert(&self) -> Option<SourceType> {
        match self {
            SourceType::Purchase => Some(SourceType::PurchaseRevert),
            SourceType::Sale => Some(SourceType::SaleRevert),
            SourceType::ReturnToStock => Some(SourceType::ReturnToStockRevert),
            SourceType::ReturnToSupplier => Some(SourceType::ReturnToSupplierRevert),
            SourceType::StockAdjustment => Some(SourceType::AdjustmentRevert),
            SourceType::PurchaseRevert
            | SourceType::SaleRevert
            | SourceType::ReturnToStockRevert
            | SourceType::ReturnToSupplierRevert
            | SourceType::AdjustmentRevert => None,
        }
    }

    /// Checks whether this is a compensating operation.
    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            SourceType::PurchaseRevert
                | SourceType::SaleRevert
                | SourceType::ReturnToStockRevert
                | SourceType::ReturnToSupplierRevert
                | SourceType::AdjustmentRevert
        )
    }

    /// Missing-level policy for this operation.
    ///
    /// Purchases, customer returns and manual adjustments may register a
    /// product at an outlet for the first time and therefore treat a missing
    /// level as zero. Sales and supplier returns require the row to exist.
    /// Reverts have no precondition beyond non-negativity: the level they
    /// compensate normally still exists, and if not, a negative revert delta
    /// fails the non-negative rule anyway.
    pub fn level_policy(&self) -> LevelPolicy {
        match self {
            SourceType::Sale | SourceType::ReturnToSupplier => LevelPolicy::RequireExisting,
            _ => LevelPolicy::CreateIfMissing,
        }
    }

    /// Stable string tag, matching the serde/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Purchase => "purchase",
            SourceType::Sale => "sale",
            SourceType::ReturnToStock => "return_to_stock",
            SourceType::ReturnToSupplier => "return_to_supplier",
            SourceType::StockAdjustment => "stock_adjustment",
            SourceType::PurchaseRevert => "purchase_revert",
            SourceType::SaleRevert => "sale_revert",
            SourceType::ReturnToStockRevert => "return_to_stock_revert",
            SourceType::ReturnToSupplierRevert => "return_to_supplier_revert",
            SourceType::AdjustmentRevert => "adjustment_revert",
        }
    }
}

impl core::fmt::Display for SourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Level Policy
// =============================================================================

/// What the mutation coordinator does when no stock level row exists yet
/// for a (product, outlet) pair touched by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPolicy {
    /// Treat the missing level as zero and create the row on first write.
    CreateIfMissing,
    /// Fail the batch with `LevelNotFound`.
    RequireExisting,
}

// =============================================================================
// Stock Level
// =============================================================================

/// Current stock quantity for one (product, outlet) pair.
///
/// One row per pair, unique together. Mutated **only** by the mutation
/// coordinator inside its transaction; every change is explained by exactly
/// one appended [`StockMovement`]. Never deleted while movements reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    /// Product identifier (UUID, validated upstream by master data).
    pub product_id: String,

    /// Outlet identifier (UUID, validated upstream by master data).
    pub outlet_id: String,

    /// Units currently on hand. Invariant: `>= 0` after every commit.
    pub quantity_on_hand: i64,

    /// Advisory reorder threshold. Never blocks an operation; only feeds
    /// low-stock reporting.
    pub minimum_threshold: i64,

    /// When the level row was first created.
    pub created_at: DateTime<Utc>,

    /// When the level row was last written by the coordinator.
    pub updated_at: DateTime<Utc>,
}

impl StockLevel {
    /// Checks whether on-hand stock has fallen to or below the advisory
    /// threshold.
    pub fn is_below_minimum(&self) -> bool {
        self.minimum_threshold > 0 && self.quantity_on_hand <= self.minimum_threshold
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One immutable audit record per applied delta.
///
/// ## Append-only Lifecycle
/// Created once inside the coordinator's transaction, never updated or
/// deleted afterwards. Corrections are **new** movements (usually a
/// `*_revert` referencing the original `source_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub product_id: String,
    pub outlet_id: String,

    /// Operation that produced this movement.
    pub source_type: SourceType,

    /// Id of the originating business document (purchase id, sale id, ...).
    /// Reverts carry the *original* document's id.
    pub source_id: String,

    /// Units added to stock. Exactly one of `quantity_in`/`quantity_out`
    /// is non-zero; both derive from one signed delta.
    pub quantity_in: i64,

    /// Units removed from stock.
    pub quantity_out: i64,

    /// `quantity_on_hand` immediately after this movement was applied.
    /// Supplied by the coordinator from its just-computed value, never
    /// re-read after the write.
    pub balance_after: i64,

    /// When the movement was applied.
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    /// The signed delta this movement recorded.
    pub fn delta(&self) -> i64 {
        self.quantity_in - self.quantity_out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_mapping() {
        assert_eq!(SourceType::Purchase.revert(), Some(SourceType::PurchaseRevert));
        assert_eq!(SourceType::Sale.revert(), Some(SourceType::SaleRevert));
        assert_eq!(
            SourceType::ReturnToStock.revert(),
            Some(SourceType::ReturnToStockRevert)
        );
        assert_eq!(
            SourceType::ReturnToSupplier.revert(),
            Some(SourceType::ReturnToSupplierRevert)
        );
        assert_eq!(
            SourceType::StockAdjustment.revert(),
            Some(SourceType::AdjustmentRevert)
        );
    }

    #[test]
    fn test_reverts_cannot_be_reverted() {
        assert_eq!(SourceType::SaleRevert.revert(), None);
        assert_eq!(SourceType::AdjustmentRevert.revert(), None);
        assert!(SourceType::SaleRevert.is_revert());
        assert!(!SourceType::Sale.is_revert());
    }

    #[test]
    fn test_level_policy_per_operation() {
        assert_eq!(SourceType::Purchase.level_policy(), LevelPolicy::CreateIfMissing);
        assert_eq!(SourceType::ReturnToStock.level_policy(), LevelPolicy::CreateIfMissing);
        assert_eq!(
            SourceType::StockAdjustment.level_policy(),
            LevelPolicy::CreateIfMissing
        );
        assert_eq!(SourceType::Sale.level_policy(), LevelPolicy::RequireExisting);
        assert_eq!(
            SourceType::ReturnToSupplier.level_policy(),
            LevelPolicy::RequireExisting
        );
    }

    #[test]
    fn test_source_type_tags_round_trip_serde() {
        let tag = serde_json::to_string(&SourceType::ReturnToSupplierRevert).unwrap();
        assert_eq!(tag, "\"return_to_supplier_revert\"");
        let back: SourceType = serde_json::from_str(&tag).unwrap();
        assert_eq!(back, SourceType::ReturnToSupplierRevert);
        assert_eq!(SourceType::ReturnToSupplierRevert.to_string(), "return_to_supplier_revert");
    }

    #[test]
    fn test_movement_delta() {
        let m = StockMovement {
            id: "m1".into(),
            product_id: "p1".into(),
            outlet_id: "o1".into(),
            source_type: SourceType::Sale,
            source_id: "s1".into(),
            quantity_in: 0,
            quantity_out: 30,
            balance_after: 70,
            occurred_at: Utc::now(),
        };
        assert_eq!(m.delta(), -30);
    }

    #[test]
    fn test_below_minimum() {
        let now = Utc::now();
        let level = StockLevel {
            product_id: "p1".into(),
            outlet_id: "o1".into(),
            quantity_on_hand: 3,
            minimum_threshold: 5,
            created_at: now,
            updated_at: now,
        };
        assert!(level.is_below_minimum());

        let no_threshold = StockLevel {
            minimum_threshold: 0,
            ..level
        };
        assert!(!no_threshold.is_below_minimum());
    }
}
