//! Propagation pipeline over cached element sets.
//!
//! # Responsibility
//! - Define the propagator capability seam (`Propagator`).
//! - Adapt the `sgp4` crate to that seam.
//! - Run a batch of records to one shared target instant with per-object
//!   failure isolation.
//!
//! # Invariants
//! - A single query propagates every record to the same instant.
//! - One object's failure never aborts the rest of the batch.

mod engine;
mod sgp4_backend;

pub use engine::PropagationEngine;
pub use sgp4_backend::{Sgp4Model, Sgp4Propagator};

use crate::time::JulianEpoch;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inertial position (km) and velocity (km/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Error reported by a propagator backend.
///
/// The message is backend-defined; the engine only records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagatorError {
    message: String,
}

impl PropagatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for PropagatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for PropagatorError {}

/// Orbit propagator capability.
///
/// Implementations must be deterministic: the same lines and epoch always
/// produce the same state vector or the same error.
pub trait Propagator {
    type Model;

    /// Builds the orbital model for one element set.
    fn build_model(&self, line1: &str, line2: &str) -> Result<Self::Model, PropagatorError>;

    /// Evaluates `model` at `epoch`.
    fn propagate(
        &self,
        model: &Self::Model,
        epoch: JulianEpoch,
    ) -> Result<StateVector, PropagatorError>;
}
