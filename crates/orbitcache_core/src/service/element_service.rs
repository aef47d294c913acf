//! Cache refresh and position query use cases.
//!
//! # Responsibility
//! - Refresh: fetch catalog text, parse it, upsert it as one batch.
//! - Query: load the cached snapshot and propagate it to one instant.
//!
//! # Invariants
//! - A failed fetch leaves the store untouched.
//! - Refresh and query never interleave within one call.
//! - An empty store is an error, never an empty report.

use crate::fetch::{CatalogFetcher, FetchError};
use crate::model::propagation::PropagationReport;
use crate::parser::parse_with_stats;
use crate::propagate::{PropagationEngine, Propagator};
use crate::repo::element_repo::{ElementRepository, RepoError};
use crate::time::{resolve, TimeError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Fetch(FetchError),
    Repo(RepoError),
    Time(TimeError),
    EmptyStore,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Time(err) => write!(f, "{err}"),
            Self::EmptyStore => write!(f, "no element sets found in the store"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Time(err) => Some(err),
            Self::EmptyStore => None,
        }
    }
}

impl From<FetchError> for ServiceError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<TimeError> for ServiceError {
    fn from(value: TimeError) -> Self {
        Self::Time(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of one cache refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub fetched_at: DateTime<Utc>,
    /// Entries written to the store.
    pub upserted: usize,
    /// Triples dropped by the parser.
    pub dropped: usize,
    /// Leftover lines after the last complete triple.
    pub trailing_lines: usize,
}

/// Use-case service over an element repository.
pub struct ElementService<R: ElementRepository> {
    repo: R,
}

impl<R: ElementRepository> ElementService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches `group` and replaces the cached entries it contains.
    ///
    /// `fetched_at` should be taken before the fetch starts so every record of
    /// the batch carries the same generation stamp.
    pub fn refresh(
        &mut self,
        fetcher: &impl CatalogFetcher,
        group: &str,
        fetched_at: DateTime<Utc>,
    ) -> ServiceResult<RefreshSummary> {
        let text = fetcher.fetch_catalog(group)?;
        self.refresh_from_text(&text, fetched_at)
    }

    /// Parses raw 3LE text and upserts the accepted entries as one batch.
    pub fn refresh_from_text(
        &mut self,
        text: &str,
        fetched_at: DateTime<Utc>,
    ) -> ServiceResult<RefreshSummary> {
        let outcome = parse_with_stats(text);
        if outcome.dropped > 0 || outcome.trailing_lines > 0 {
            warn!(
                "event=elements_parse module=service status=partial accepted={} dropped={} trailing_lines={}",
                outcome.entries.len(),
                outcome.dropped,
                outcome.trailing_lines
            );
        }

        let upserted = self.repo.upsert_latest(&outcome.entries, fetched_at)?;
        info!(
            "event=cache_refresh module=service status=ok upserted={} dropped={}",
            upserted, outcome.dropped
        );

        Ok(RefreshSummary {
            fetched_at,
            upserted,
            dropped: outcome.dropped,
            trailing_lines: outcome.trailing_lines,
        })
    }

    /// Propagates up to `limit` cached records (`0` = all) to `target`.
    ///
    /// # Errors
    /// - `ServiceError::EmptyStore` when no records are cached.
    pub fn query<P: Propagator>(
        &self,
        engine: &PropagationEngine<P>,
        limit: u32,
        target: DateTime<Utc>,
    ) -> ServiceResult<PropagationReport> {
        let records = self.repo.load_latest(limit)?;
        if records.is_empty() {
            warn!("event=positions_query module=service status=error error_code=empty_store");
            return Err(ServiceError::EmptyStore);
        }
        Ok(engine.propagate(&records, target))
    }

    /// Propagates cached records to `now_utc + offset_minutes`.
    pub fn query_ahead<P: Propagator>(
        &self,
        engine: &PropagationEngine<P>,
        limit: u32,
        now_utc: DateTime<Utc>,
        offset_minutes: i64,
    ) -> ServiceResult<PropagationReport> {
        let target = resolve(now_utc, offset_minutes)?;
        self.query(engine, limit, target)
    }

    /// Number of cached records.
    pub fn cached_count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count()?)
    }
}
