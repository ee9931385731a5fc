//! # tally-core: Pure Ledger Logic for Tally POS
//!
//! This crate is the **heart** of the Tally POS inventory ledger. It contains
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Tally POS Ledger Architecture                   │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │            Business-document layer (out of scope)             │ │
//! │  │   Purchase CRUD ── Sale CRUD ── Return CRUD ── Adjustments    │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ tally-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐  │ │
//! │  │   │   types   │  │   batch   │  │ movement  │  │  error   │  │ │
//! │  │   │StockLevel │  │DeltaBatch │  │ in/out    │  │ Ledger   │  │ │
//! │  │   │ Movement  │  │ per-op    │  │ split     │  │ Error    │  │ │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └──────────┘  │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                  tally-db (Database Layer)                    │ │
//! │  │        SQLite transactions, repositories, coordinator         │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockLevel, StockMovement, SourceType, ...)
//! - [`batch`] - Delta batch construction per business operation
//! - [`movement`] - Signed delta → quantity_in/quantity_out derivation
//! - [`error`] - Ledger error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Quantities**: All quantities are whole units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod error;
pub mod movement;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::DeltaBatch` instead of
// `use tally_core::batch::DeltaBatch`

pub use batch::{AdjustmentItem, DeltaBatch, LineItem, StockDelta};
pub use error::{LedgerError, LedgerResult};
pub use movement::derive_movement;
pub use types::{LevelPolicy, SourceType, StockLevel, StockMovement};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single delta batch
///
/// ## Business Reason
/// Bounds transaction size and lock hold time on the ledger. A purchase
/// receipt or sale with more lines than this should be split upstream.
pub const MAX_BATCH_ITEMS: usize = 500;

/// Maximum quantity for a single line item
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 10000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;
