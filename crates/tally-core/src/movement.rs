//! # Movement Derivation
//!
//! Pure derivation of a [`StockMovement`] record from a signed delta.
//!
//! ## Derivation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Signed Delta → Movement                          │
//! │                                                                     │
//! │   delta = +15   ──►  quantity_in = 15, quantity_out = 0             │
//! │   delta = -30   ──►  quantity_in = 0,  quantity_out = 30            │
//! │                                                                     │
//! │   balance_after = the coordinator's just-computed new quantity.     │
//! │   It is passed IN, never re-read from storage after the write;      │
//! │   a re-read would race with concurrent writers.                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The side effect (appending the row) lives in `tally-db`; this module only
//! builds the value.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{SourceType, StockMovement};

/// Builds the movement record for one applied delta.
///
/// ## Arguments
/// * `delta` - Signed quantity change, non-zero
/// * `balance_after` - `quantity_on_hand` right after the delta was applied,
///   as computed by the caller inside its transaction
///
/// ## Returns
/// A movement with exactly one of `quantity_in`/`quantity_out` non-zero.
pub fn derive_movement(
    product_id: &str,
    outlet_id: &str,
    delta: i64,
    source_type: SourceType,
    source_id: &str,
    balance_after: i64,
    occurred_at: DateTime<Utc>,
) -> StockMovement {
    StockMovement {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        outlet_id: outlet_id.to_string(),
        source_type,
        source_id: source_id.to_string(),
        quantity_in: delta.max(0),
        quantity_out: (-delta).max(0),
        balance_after,
        occurred_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_delta_is_inbound() {
        let m = derive_movement("p1", "o1", 15, SourceType::Purchase, "doc-1", 115, Utc::now());
        assert_eq!(m.quantity_in, 15);
        assert_eq!(m.quantity_out, 0);
        assert_eq!(m.balance_after, 115);
        assert_eq!(m.delta(), 15);
    }

    #[test]
    fn test_negative_delta_is_outbound() {
        let m = derive_movement("p1", "o1", -30, SourceType::Sale, "doc-2", 70, Utc::now());
        assert_eq!(m.quantity_in, 0);
        assert_eq!(m.quantity_out, 30);
        assert_eq!(m.balance_after, 70);
        assert_eq!(m.delta(), -30);
    }

    #[test]
    fn test_exactly_one_side_nonzero() {
        for delta in [-3i64, -1, 1, 3, 1000] {
            let m = derive_movement("p", "o", delta, SourceType::StockAdjustment, "d", 0, Utc::now());
            assert!((m.quantity_in == 0) ^ (m.quantity_out == 0) || delta == 0);
            assert!(m.quantity_in >= 0 && m.quantity_out >= 0);
        }
    }

    #[test]
    fn test_fresh_id_per_movement() {
        let now = Utc::now();
        let a = derive_movement("p", "o", 1, SourceType::Purchase, "d", 1, now);
        let b = derive_movement("p", "o", 1, SourceType::Purchase, "d", 1, now);
        assert_ne!(a.id, b.id);
    }
}
