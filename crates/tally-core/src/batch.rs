//! # Delta Batches
//!
//! Translates a business intent (purchase, sale, return, adjustment, revert)
//! into the batch of signed deltas the mutation coordinator applies
//! atomically.
//!
//! ## Operation → Delta Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  operation           delta/item   missing level    source_type      │
//! │  ─────────────────   ──────────   ─────────────    ───────────────  │
//! │  purchase            +qty         create           purchase         │
//! │  sale                -qty         error            sale             │
//! │  return to stock     +qty         create           return_to_stock  │
//! │  return to supplier  -qty         error            return_to_suppl. │
//! │  stock adjustment    signed       create           stock_adjustment │
//! │  revert of any       inverse      create           <orig>_revert    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deltas keep the submission order of the line items. Within one batch this
//! only affects which item's validation error is reported first; the batch
//! still commits or aborts as a whole.
//!
//! Reverts are built from the **committed movements** of the original
//! document, never re-derived from its current line items, so a document
//! edited after commit still reverts exactly what was applied.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::types::{SourceType, StockMovement};
use crate::{MAX_BATCH_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Line Items
// =============================================================================

/// One validated line item of a business document: always a positive
/// quantity; the operation decides the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub outlet_id: String,
    /// Units, must be `> 0`.
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, outlet_id: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            outlet_id: outlet_id.into(),
            quantity,
        }
    }
}

/// One line of a manual stock adjustment: the delta is explicit and signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentItem {
    pub product_id: String,
    pub outlet_id: String,
    /// Signed change, must be non-zero.
    pub delta: i64,
}

impl AdjustmentItem {
    pub fn new(product_id: impl Into<String>, outlet_id: impl Into<String>, delta: i64) -> Self {
        AdjustmentItem {
            product_id: product_id.into(),
            outlet_id: outlet_id.into(),
            delta,
        }
    }
}

// =============================================================================
// Stock Delta
// =============================================================================

/// A signed quantity change for one (product, outlet) pair, ready for the
/// coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: String,
    pub outlet_id: String,
    pub delta: i64,
}

// =============================================================================
// Delta Batch
// =============================================================================

/// The set of deltas produced by one business operation.
///
/// The whole batch commits or aborts together; construction validates shape
/// (non-empty, bounded, usable quantities) so the coordinator never starts a
/// transaction for a malformed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaBatch {
    source_type: SourceType,
    source_id: String,
    deltas: Vec<StockDelta>,
}

impl DeltaBatch {
    /// Goods received from a supplier: `+quantity` per item.
    pub fn purchase(source_id: impl Into<String>, items: &[LineItem]) -> LedgerResult<Self> {
        Self::from_line_items(SourceType::Purchase, source_id, items, 1)
    }

    /// Goods sold: `-quantity` per item.
    pub fn sale(source_id: impl Into<String>, items: &[LineItem]) -> LedgerResult<Self> {
        Self::from_line_items(SourceType::Sale, source_id, items, -1)
    }

    /// Customer return accepted back into stock: `+quantity` per item.
    pub fn return_to_stock(source_id: impl Into<String>, items: &[LineItem]) -> LedgerResult<Self> {
        Self::from_line_items(SourceType::ReturnToStock, source_id, items, 1)
    }

    /// Goods sent back to a supplier: `-quantity` per item.
    pub fn return_to_supplier(
        source_id: impl Into<String>,
        items: &[LineItem],
    ) -> LedgerResult<Self> {
        Self::from_line_items(SourceType::ReturnToSupplier, source_id, items, -1)
    }

    /// Manual correction with explicit signed deltas.
    pub fn adjustment(source_id: impl Into<String>, items: &[AdjustmentItem]) -> LedgerResult<Self> {
        check_batch_size(items.len())?;

        let mut deltas = Vec::with_capacity(items.len());
        for item in items {
            if item.delta == 0 {
                return Err(LedgerError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: 0,
                    reason: "adjustment delta cannot be zero",
                });
            }
            if item.delta.abs() > MAX_ITEM_QUANTITY {
                return Err(LedgerError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.delta,
                    reason: "delta exceeds per-item maximum",
                });
            }
            deltas.push(StockDelta {
                product_id: item.product_id.clone(),
                outlet_id: item.outlet_id.clone(),
                delta: item.delta,
            });
        }

        Ok(DeltaBatch {
            source_type: SourceType::StockAdjustment,
            source_id: source_id.into(),
            deltas,
        })
    }

    /// Compensating batch for a committed document, built from its recorded
    /// movements.
    ///
    /// ## Arguments
    /// * `original` - Source type of the document being reverted
    /// * `source_id` - The *original* document's id; the revert keeps it
    /// * `movements` - All movements committed for (original, source_id)
    ///
    /// ## Returns
    /// * `Err(NotRevertible)` - `original` is itself a revert
    /// * `Err(NothingToRevert)` - no movements were recorded
    pub fn revert_of(
        original: SourceType,
        source_id: impl Into<String>,
        movements: &[StockMovement],
    ) -> LedgerResult<Self> {
        let source_id = source_id.into();

        let revert_type = original
            .revert()
            .ok_or(LedgerError::NotRevertible { source_type: original })?;

        if movements.is_empty() {
            return Err(LedgerError::NothingToRevert {
                source_type: original,
                source_id,
            });
        }

        let deltas = movements
            .iter()
            .map(|m| StockDelta {
                product_id: m.product_id.clone(),
                outlet_id: m.outlet_id.clone(),
                delta: -m.delta(),
            })
            .collect();

        Ok(DeltaBatch {
            source_type: revert_type,
            source_id,
            deltas,
        })
    }

    fn from_line_items(
        source_type: SourceType,
        source_id: impl Into<String>,
        items: &[LineItem],
        sign: i64,
    ) -> LedgerResult<Self> {
        check_batch_size(items.len())?;

        let mut deltas = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity <= 0 {
                return Err(LedgerError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    reason: "quantity must be positive",
                });
            }
            if item.quantity > MAX_ITEM_QUANTITY {
                return Err(LedgerError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    reason: "quantity exceeds per-item maximum",
                });
            }
            deltas.push(StockDelta {
                product_id: item.product_id.clone(),
                outlet_id: item.outlet_id.clone(),
                delta: sign * item.quantity,
            });
        }

        Ok(DeltaBatch {
            source_type,
            source_id: source_id.into(),
            deltas,
        })
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Deltas in line-item submission order.
    pub fn deltas(&self) -> &[StockDelta] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

fn check_batch_size(count: usize) -> LedgerResult<()> {
    if count == 0 {
        return Err(LedgerError::EmptyBatch);
    }
    if count > MAX_BATCH_ITEMS {
        return Err(LedgerError::BatchTooLarge {
            count,
            max: MAX_BATCH_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("p1", "o1", 10),
            LineItem::new("p2", "o1", 5),
            LineItem::new("p3", "o1", 20),
        ]
    }

    #[test]
    fn test_purchase_deltas_are_positive_in_order() {
        let batch = DeltaBatch::purchase("po-1", &items()).unwrap();
        assert_eq!(batch.source_type(), SourceType::Purchase);
        assert_eq!(batch.source_id(), "po-1");
        let deltas: Vec<i64> = batch.deltas().iter().map(|d| d.delta).collect();
        assert_eq!(deltas, vec![10, 5, 20]);
    }

    #[test]
    fn test_sale_deltas_are_negative() {
        let batch = DeltaBatch::sale("sale-1", &items()).unwrap();
        let deltas: Vec<i64> = batch.deltas().iter().map(|d| d.delta).collect();
        assert_eq!(deltas, vec![-10, -5, -20]);
    }

    #[test]
    fn test_return_signs() {
        let to_stock = DeltaBatch::return_to_stock("ret-1", &items()[..1]).unwrap();
        assert_eq!(to_stock.deltas()[0].delta, 10);

        let to_supplier = DeltaBatch::return_to_supplier("ret-2", &items()[..1]).unwrap();
        assert_eq!(to_supplier.deltas()[0].delta, -10);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(DeltaBatch::sale("sale-1", &[]), Err(LedgerError::EmptyBatch));
        assert_eq!(
            DeltaBatch::adjustment("adj-1", &[]),
            Err(LedgerError::EmptyBatch)
        );
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let bad = vec![LineItem::new("p1", "o1", 0)];
        assert!(matches!(
            DeltaBatch::sale("sale-1", &bad),
            Err(LedgerError::InvalidQuantity { quantity: 0, .. })
        ));

        let negative = vec![LineItem::new("p1", "o1", -4)];
        assert!(matches!(
            DeltaBatch::purchase("po-1", &negative),
            Err(LedgerError::InvalidQuantity { quantity: -4, .. })
        ));
    }

    #[test]
    fn test_zero_adjustment_rejected() {
        let bad = vec![AdjustmentItem::new("p1", "o1", 0)];
        assert!(matches!(
            DeltaBatch::adjustment("adj-1", &bad),
            Err(LedgerError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_adjustment_keeps_signs() {
        let batch = DeltaBatch::adjustment(
            "adj-1",
            &[
                AdjustmentItem::new("p1", "o1", -40),
                AdjustmentItem::new("p2", "o1", 12),
            ],
        )
        .unwrap();
        let deltas: Vec<i64> = batch.deltas().iter().map(|d| d.delta).collect();
        assert_eq!(deltas, vec![-40, 12]);
        assert_eq!(batch.source_type(), SourceType::StockAdjustment);
    }

    fn movement(product: &str, delta: i64) -> StockMovement {
        crate::movement::derive_movement(
            product,
            "o1",
            delta,
            SourceType::Sale,
            "sale-1",
            0,
            Utc::now(),
        )
    }

    #[test]
    fn test_revert_inverts_recorded_movements() {
        let movements = vec![movement("p1", -20), movement("p2", -5)];
        let batch = DeltaBatch::revert_of(SourceType::Sale, "sale-1", &movements).unwrap();

        assert_eq!(batch.source_type(), SourceType::SaleRevert);
        assert_eq!(batch.source_id(), "sale-1");
        let deltas: Vec<i64> = batch.deltas().iter().map(|d| d.delta).collect();
        assert_eq!(deltas, vec![20, 5]);
    }

    #[test]
    fn test_revert_of_revert_rejected() {
        let movements = vec![movement("p1", 20)];
        assert_eq!(
            DeltaBatch::revert_of(SourceType::SaleRevert, "sale-1", &movements),
            Err(LedgerError::NotRevertible {
                source_type: SourceType::SaleRevert
            })
        );
    }

    #[test]
    fn test_revert_without_movements_rejected() {
        assert!(matches!(
            DeltaBatch::revert_of(SourceType::Purchase, "po-9", &[]),
            Err(LedgerError::NothingToRevert { .. })
        ));
    }
}
