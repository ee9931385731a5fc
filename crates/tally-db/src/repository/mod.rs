//! # Repository Module
//!
//! Database repository implementations for the Tally POS ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Two Kinds of Access Paths                        │
//! │                                                                     │
//! │  Pool-based reads (public)                                          │
//! │      db.levels().get(product, outlet)                               │
//! │      db.movements().history(product, outlet, 50)                    │
//! │          │                                                          │
//! │          ▼  own connection from the pool, no transaction            │
//! │                                                                     │
//! │  Transaction-scoped writes (crate-private)                          │
//! │      LevelRepository::upsert_on(&mut *tx, ...)                      │
//! │      MovementRepository::append_on(&mut *tx, ...)                   │
//! │          │                                                          │
//! │          ▼  run on the coordinator's connection so the whole        │
//! │             batch commits or rolls back together                    │
//! │                                                                     │
//! │  Quantity writes never have a public entry point: the mutation      │
//! │  coordinator is the only caller.                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`level::LevelRepository`] - Current stock per (product, outlet)
//! - [`movement::MovementRepository`] - Append-only movement audit trail

pub mod level;
pub mod movement;
