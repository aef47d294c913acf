//! Propagation output model.
//!
//! # Invariants
//! - `PropagationResult` is only built for objects that propagated
//!   successfully; failures travel separately as `PropagationFailure`.
//! - Every result of one report shares the report's target time.

use crate::model::element::CatalogId;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Position and velocity of one object at the target time.
///
/// Vectors are in the TEME inertial frame, as returned by SGP4.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationResult {
    pub catalog_id: CatalogId,
    pub name: String,
    /// RFC 3339 UTC instant with `Z` suffix.
    pub target_time: String,
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Step of the per-object pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationStage {
    /// Element lines could not be turned into an orbital model.
    ModelBuild,
    /// The model rejected the requested time.
    Propagate,
}

impl PropagationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelBuild => "model_build",
            Self::Propagate => "propagate",
        }
    }
}

impl Display for PropagationStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object excluded from a propagation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationFailure {
    pub catalog_id: CatalogId,
    pub name: String,
    pub stage: PropagationStage,
    pub message: String,
}

/// Outcome of propagating a batch of records to one target instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationReport {
    /// RFC 3339 UTC instant shared by every result.
    pub target_time: String,
    pub results: Vec<PropagationResult>,
    pub failures: Vec<PropagationFailure>,
}

impl PropagationReport {
    /// Number of objects excluded from `results`.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}
