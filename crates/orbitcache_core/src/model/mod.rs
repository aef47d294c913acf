//! Domain model for cached element sets and propagation output.
//!
//! # Responsibility
//! - Define canonical data structures shared by parser, store and engine.
//! - Keep one element-set shape from catalog text to SQLite rows.
//!
//! # Invariants
//! - Every cached object is identified by a positive `CatalogId`.
//! - Stored records are overwritten on refresh, never duplicated.

pub mod element;
pub mod propagation;
