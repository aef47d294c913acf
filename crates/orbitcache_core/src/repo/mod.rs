//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for cached elements.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate every record before it is committed.
//! - Refresh batches are applied all-or-nothing.

pub mod element_repo;
