//! Core of the orbit cache: element parsing, SQLite element store, time
//! resolution and SGP4 propagation.
//! This crate is the single source of truth for element-set invariants.

pub mod config;
pub mod db;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod parser;
pub mod propagate;
pub mod repo;
pub mod service;
pub mod time;

pub use config::{AppConfig, ConfigError};
pub use fetch::{CatalogFetcher, FetchError, HttpCatalogFetcher};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::element::{CatalogId, ElementRecord, ElementValidationError, TleEntry};
pub use model::propagation::{
    PropagationFailure, PropagationReport, PropagationResult, PropagationStage,
};
pub use parser::{parse_three_line, parse_with_stats, ParseOutcome, ThreeLineElements};
pub use propagate::{
    PropagationEngine, Propagator, PropagatorError, Sgp4Model, Sgp4Propagator, StateVector,
};
pub use repo::element_repo::{ElementRepository, RepoError, RepoResult, SqliteElementRepository};
pub use service::element_service::{ElementService, RefreshSummary, ServiceError, ServiceResult};
pub use time::{format_utc, resolve, to_epoch, JulianEpoch, TimeError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
