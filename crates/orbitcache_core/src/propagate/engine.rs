//! Batch propagation engine.
//!
//! # Invariants
//! - Stateless: identical records and target instant yield identical reports.
//! - No retries; propagation failures are deterministic in their inputs.

use super::Propagator;
use crate::model::element::ElementRecord;
use crate::model::propagation::{
    PropagationFailure, PropagationReport, PropagationResult, PropagationStage,
};
use crate::time::{format_utc, to_epoch};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Instant;

/// Propagates cached records through a `Propagator`.
pub struct PropagationEngine<P: Propagator> {
    propagator: P,
}

impl<P: Propagator> PropagationEngine<P> {
    pub fn new(propagator: P) -> Self {
        Self { propagator }
    }

    /// Propagates every record to `target`.
    ///
    /// All records share the one target instant. Objects whose model cannot
    /// be built or evaluated are reported in `failures` and left out of
    /// `results`; results keep the input order.
    pub fn propagate(&self, records: &[ElementRecord], target: DateTime<Utc>) -> PropagationReport {
        let started_at = Instant::now();
        let epoch = to_epoch(target);
        let target_time = format_utc(target);
        debug!(
            "event=propagate_batch module=propagate status=start count={} target={} jd={} fr={}",
            records.len(),
            target_time,
            epoch.days,
            epoch.fraction
        );

        let mut results = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for record in records {
            let outcome = self
                .propagator
                .build_model(&record.line1, &record.line2)
                .map_err(|err| (PropagationStage::ModelBuild, err))
                .and_then(|model| {
                    self.propagator
                        .propagate(&model, epoch)
                        .map_err(|err| (PropagationStage::Propagate, err))
                });

            match outcome {
                Ok(state) => results.push(PropagationResult {
                    catalog_id: record.catalog_id,
                    name: record.name.clone(),
                    target_time: target_time.clone(),
                    position_km: state.position_km,
                    velocity_km_s: state.velocity_km_s,
                }),
                Err((stage, err)) => {
                    warn!(
                        "event=propagate_object module=propagate status=error catalog_id={} stage={} error={}",
                        record.catalog_id, stage, err
                    );
                    failures.push(PropagationFailure {
                        catalog_id: record.catalog_id,
                        name: record.name.clone(),
                        stage,
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            "event=propagate_batch module=propagate status=ok target={} ok={} failed={} duration_ms={}",
            target_time,
            results.len(),
            failures.len(),
            started_at.elapsed().as_millis()
        );

        PropagationReport {
            target_time,
            results,
            failures,
        }
    }
}
