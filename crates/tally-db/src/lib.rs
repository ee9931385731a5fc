//! # tally-db: Database Layer for the Tally POS Ledger
//!
//! This crate provides persistence for the inventory ledger: current stock
//! levels, the append-only movement audit trail, and the transactional
//! mutation coordinator that keeps the two consistent. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Tally POS Ledger Data Flow                    │
//! │                                                                     │
//! │  Business operation (receive purchase, record sale, void, ...)      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    tally-db (THIS CRATE)                      │ │
//! │  │                                                               │ │
//! │  │  ┌────────────┐   ┌─────────────┐   ┌─────────────────────┐  │ │
//! │  │  │ operations │──►│   ledger    │──►│    repositories     │  │ │
//! │  │  │  handlers  │   │ coordinator │   │  levels, movements  │  │ │
//! │  │  └────────────┘   │ (1 tx/batch)│   └─────────────────────┘  │ │
//! │  │                   └─────────────┘                             │ │
//! │  │  ┌────────────┐   ┌─────────────┐                             │ │
//! │  │  │  Database  │   │ migrations  │                             │ │
//! │  │  │ (pool.rs)  │   │ (embedded)  │                             │ │
//! │  │  └────────────┘   └─────────────┘                             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Level and movement repositories
//! - [`ledger`] - The mutation coordinator (one transaction per batch)
//! - [`operations`] - Business operation handlers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::LineItem;
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tally.db")).await?;
//!
//! // Receive goods, then sell some
//! let ops = db.operations();
//! ops.receive_purchase("po-1", &[LineItem::new(product, outlet, 100)]).await?;
//! ops.record_sale("sale-1", &[LineItem::new(product, outlet, 30)]).await?;
//!
//! // Current stock and audit trail
//! let level = db.levels().get(&product, &outlet).await?;
//! let trail = db.movements().history(&product, &outlet, 50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod operations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{ApplyError, ApplyResult, Ledger};
pub use operations::Operations;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::level::LevelRepository;
pub use repository::movement::MovementRepository;
