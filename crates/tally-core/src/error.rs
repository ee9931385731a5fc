//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  tally-core errors (this file)                                      │
//! │  └── LedgerError      - Batch validation + business-rule failures   │
//! │                                                                     │
//! │  tally-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── ApplyError       - LedgerError | DbError at the coordinator    │
//! │                                                                     │
//! │  Flow: LedgerError → ApplyError → business-document error shape     │
//! │        (e.g. HTTP 400 for InsufficientStock, 409 for conflicts)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, requested, available)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::SourceType;

// =============================================================================
// Ledger Error
// =============================================================================

/// Ledger business-rule and validation errors.
///
/// Validation variants (`EmptyBatch`, `InvalidQuantity`, `BatchTooLarge`)
/// are raised before any persistence attempt. Business-rule variants
/// (`InsufficientStock`, `LevelNotFound`) are raised inside the atomic unit
/// of work and guarantee no visible effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A delta would drive stock below zero.
    ///
    /// ## When This Occurs
    /// - Selling more than is on hand
    /// - Returning more to a supplier than is on hand
    /// - A negative adjustment larger than the current level
    ///
    /// Carries enough detail for the caller to render a user message.
    #[error(
        "insufficient stock for product {product_id} at outlet {outlet_id}: \
         requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: String,
        outlet_id: String,
        requested: i64,
        available: i64,
    },

    /// No stock level exists for the pair and the operation requires one.
    ///
    /// Raised only for *stock-level* absence. Referential integrity of the
    /// ids themselves is the master-data layer's concern.
    #[error("no stock level for product {product_id} at outlet {outlet_id}")]
    LevelNotFound {
        product_id: String,
        outlet_id: String,
    },

    /// A batch with no line items.
    #[error("batch has no line items")]
    EmptyBatch,

    /// A batch exceeding the per-transaction item bound.
    #[error("batch has {count} items, maximum is {max}")]
    BatchTooLarge { count: usize, max: usize },

    /// A line item with an unusable quantity: zero or negative for
    /// purchases/sales/returns, zero for adjustments, or beyond the
    /// per-item bound.
    #[error("invalid quantity {quantity} for product {product_id}: {reason}")]
    InvalidQuantity {
        product_id: String,
        quantity: i64,
        reason: &'static str,
    },

    /// A revert was requested for a document with no recorded movements.
    ///
    /// ## When This Occurs
    /// - Deleting a draft document that never touched stock
    /// - Passing the wrong source id
    #[error("nothing to revert for {source_type} {source_id}")]
    NothingToRevert {
        source_type: SourceType,
        source_id: String,
    },

    /// A revert was requested for a source type that is itself a revert.
    #[error("{source_type} is a compensating operation and cannot be reverted")]
    NotRevertible { source_type: SourceType },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = LedgerError::InsufficientStock {
            product_id: "prod-7".to_string(),
            outlet_id: "outlet-1".to_string(),
            requested: 150,
            available: 100,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product prod-7 at outlet outlet-1: \
             requested 150, available 100"
        );
    }

    #[test]
    fn test_level_not_found_message() {
        let err = LedgerError::LevelNotFound {
            product_id: "prod-7".to_string(),
            outlet_id: "outlet-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no stock level for product prod-7 at outlet outlet-1"
        );
    }

    #[test]
    fn test_nothing_to_revert_message() {
        let err = LedgerError::NothingToRevert {
            source_type: SourceType::Sale,
            source_id: "sale-9".to_string(),
        };
        assert_eq!(err.to_string(), "nothing to revert for sale sale-9");
    }
}
