//! Element set domain model.
//!
//! # Responsibility
//! - Define the parsed (`TleEntry`) and persisted (`ElementRecord`) shapes of
//!   a two-line element set.
//! - Provide validation shared by store write and read paths.
//!
//! # Invariants
//! - `line1` starts with `1` and `line2` starts with `2`.
//! - `catalog_id` is positive and matches columns 3-7 of `line1`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// Catalog number of a tracked object (NORAD id).
pub type CatalogId = u32;

const LINE1_MARKER: char = '1';
const LINE2_MARKER: char = '2';
/// Byte range of the catalog number inside line 1.
const CATALOG_ID_RANGE: Range<usize> = 2..7;

/// Element set as produced by the parser, before it is stamped by a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TleEntry {
    pub catalog_id: CatalogId,
    /// Object name from the title line of the 3LE triple.
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Element set persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub catalog_id: CatalogId,
    pub name: String,
    pub line1: String,
    pub line2: String,
    /// Start of the refresh that last wrote this record.
    pub fetched_at: DateTime<Utc>,
}

/// Validation failures for element sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValidationError {
    NonPositiveCatalogId,
    BadLineMarker { line: u8 },
    CatalogIdMismatch {
        catalog_id: CatalogId,
        embedded: Option<CatalogId>,
    },
}

impl Display for ElementValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveCatalogId => write!(f, "catalog id must be positive"),
            Self::BadLineMarker { line } => {
                write!(f, "line {line} does not start with marker `{line}`")
            }
            Self::CatalogIdMismatch {
                catalog_id,
                embedded: Some(embedded),
            } => write!(
                f,
                "catalog id {catalog_id} does not match id {embedded} embedded in line 1"
            ),
            Self::CatalogIdMismatch {
                catalog_id,
                embedded: None,
            } => write!(
                f,
                "catalog id {catalog_id} but line 1 carries no parseable id"
            ),
        }
    }
}

impl Error for ElementValidationError {}

/// Extracts the catalog number from columns 3-7 of line 1.
///
/// Returns `None` when the range is missing or does not parse as a positive
/// integer.
pub fn catalog_id_from_line1(line1: &str) -> Option<CatalogId> {
    let raw = line1.get(CATALOG_ID_RANGE)?;
    match raw.trim().parse::<CatalogId>() {
        Ok(0) | Err(_) => None,
        Ok(id) => Some(id),
    }
}

/// Returns whether both lines carry the expected leading markers.
pub fn has_line_markers(line1: &str, line2: &str) -> bool {
    line1.starts_with(LINE1_MARKER) && line2.starts_with(LINE2_MARKER)
}

fn validate_parts(
    catalog_id: CatalogId,
    line1: &str,
    line2: &str,
) -> Result<(), ElementValidationError> {
    if catalog_id == 0 {
        return Err(ElementValidationError::NonPositiveCatalogId);
    }
    if !line1.starts_with(LINE1_MARKER) {
        return Err(ElementValidationError::BadLineMarker { line: 1 });
    }
    if !line2.starts_with(LINE2_MARKER) {
        return Err(ElementValidationError::BadLineMarker { line: 2 });
    }
    let embedded = catalog_id_from_line1(line1);
    if embedded != Some(catalog_id) {
        return Err(ElementValidationError::CatalogIdMismatch {
            catalog_id,
            embedded,
        });
    }
    Ok(())
}

impl TleEntry {
    /// Checks the element-set invariants.
    pub fn validate(&self) -> Result<(), ElementValidationError> {
        validate_parts(self.catalog_id, &self.line1, &self.line2)
    }

    /// Stamps this entry with the refresh time, producing a storable record.
    pub fn into_record(self, fetched_at: DateTime<Utc>) -> ElementRecord {
        ElementRecord {
            catalog_id: self.catalog_id,
            name: self.name,
            line1: self.line1,
            line2: self.line2,
            fetched_at,
        }
    }
}

impl ElementRecord {
    /// Checks the element-set invariants.
    pub fn validate(&self) -> Result<(), ElementValidationError> {
        validate_parts(self.catalog_id, &self.line1, &self.line2)
    }
}
