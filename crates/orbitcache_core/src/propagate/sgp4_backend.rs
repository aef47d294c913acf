//! `sgp4` crate adapter.

use super::{PropagatorError, Propagator, StateVector};
use crate::time::{to_epoch, JulianEpoch};
use std::borrow::Cow;
use std::f64::consts::PI;

/// Column (0-based) of the modulo-10 checksum digit on both TLE lines.
const CHECKSUM_COLUMN: usize = 68;
const DEGREES_TO_RADIANS: f64 = PI / 180.0;
/// rev/day -> rad/min
const REVS_PER_DAY_TO_RADIANS_PER_MINUTE: f64 = PI / 720.0;

/// SGP4 model plus the epoch of the element set it was built from.
pub struct Sgp4Model {
    constants: sgp4::Constants,
    epoch: JulianEpoch,
}

impl Sgp4Model {
    /// Epoch of the underlying element set.
    pub fn epoch(&self) -> JulianEpoch {
        self.epoch
    }
}

/// Propagator backed by the `sgp4` crate (WGS72, improved mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self
    }
}

impl Propagator for Sgp4Propagator {
    type Model = Sgp4Model;

    fn build_model(&self, line1: &str, line2: &str) -> Result<Sgp4Model, PropagatorError> {
        let line1 = with_checksum(line1);
        let line2 = with_checksum(line2);
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|err| PropagatorError::new(format!("tle: {err}")))?;

        // WGS72 geopotential, matching the reference SGP4 implementations.
        let orbit = sgp4::Orbit::from_kozai_elements(
            &sgp4::WGS72,
            elements.inclination * DEGREES_TO_RADIANS,
            elements.right_ascension * DEGREES_TO_RADIANS,
            elements.eccentricity,
            elements.argument_of_perigee * DEGREES_TO_RADIANS,
            elements.mean_anomaly * DEGREES_TO_RADIANS,
            elements.mean_motion * REVS_PER_DAY_TO_RADIANS_PER_MINUTE,
        )
        .map_err(|err| PropagatorError::new(format!("elements: {err}")))?;
        let constants = sgp4::Constants::new(
            sgp4::WGS72,
            sgp4::iau_epoch_to_sidereal_time,
            elements.epoch(),
            elements.drag_term,
            orbit,
        )
        .map_err(|err| PropagatorError::new(format!("elements: {err}")))?;

        Ok(Sgp4Model {
            constants,
            epoch: to_epoch(elements.datetime.and_utc()),
        })
    }

    fn propagate(
        &self,
        model: &Sgp4Model,
        epoch: JulianEpoch,
    ) -> Result<StateVector, PropagatorError> {
        let minutes = epoch.minutes_since(&model.epoch);
        let prediction = model
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|err| PropagatorError::new(format!("sgp4: {err}")))?;

        let finite = prediction
            .position
            .iter()
            .chain(prediction.velocity.iter())
            .all(|value| value.is_finite());
        if !finite {
            return Err(PropagatorError::new(format!(
                "sgp4: non-finite state vector at {minutes} minutes from epoch"
            )));
        }

        Ok(StateVector {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

/// Rewrites the checksum digit so catalogs with stale checksums still build.
///
/// Lines too short to carry a checksum, or not ASCII, are returned unchanged
/// and left for the TLE parser to reject.
fn with_checksum(line: &str) -> Cow<'_, str> {
    if !line.is_ascii() || line.len() <= CHECKSUM_COLUMN {
        return Cow::Borrowed(line);
    }
    let sum: u32 = line.as_bytes()[..CHECKSUM_COLUMN]
        .iter()
        .map(|byte| match byte {
            b'0'..=b'9' => u32::from(byte - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    let digit = char::from(b'0' + (sum % 10) as u8);
    if line[CHECKSUM_COLUMN..].starts_with(digit) {
        return Cow::Borrowed(line);
    }
    let mut fixed = String::with_capacity(line.len());
    fixed.push_str(&line[..CHECKSUM_COLUMN]);
    fixed.push(digit);
    fixed.push_str(&line[CHECKSUM_COLUMN + 1..]);
    Cow::Owned(fixed)
}
