//! # Validation against reference ephemerides
//!
//! Measures the 3-D error between the latest stored estimate of an object and an independent
//! reference position, and persists the comparison as a [`ValidationResult`].
//!
//! ## Distance
//!
//! ```text
//! a = sin²(Δφ/2) + cos φ₁ cos φ₂ sin²(Δλ/2)
//! d_h = 2 R atan2(√a, √(1 − a))          R = 6 371 000 m (mean radius)
//! d   = √(d_h² + (1000 Δalt_km)²)
//! ```
//!
//! The horizontal term uses the mean Earth radius; the propagator works with the equatorial
//! radius.
//!
//! Missing data is never replaced: without a stored estimate or a reference position the
//! validation is absent (`None`) and nothing is written.

use hifitime::Epoch;
use log::{info, warn};

use crate::constants::{Meter, ObjectId, EARTH_MEAN_RADIUS, METERS_PER_KM};
use crate::integrity::{DataIntegrity, DataSource};
use crate::providers::ReferenceEphemerisProvider;
use crate::state::GeodeticPosition;
use crate::storage::{TrackingStore, ValidationResult};

/// 3-D distance in meters between two spherical geodetic positions.
///
/// Arguments
/// -----------------
/// * `predicted`, `actual`: latitude/longitude in degrees, altitude in kilometers.
///
/// Return
/// ----------
/// * The haversine surface distance on the mean-radius sphere combined with the altitude
///   difference.
pub fn haversine_3d(predicted: &GeodeticPosition, actual: &GeodeticPosition) -> Meter {
    let lat1 = predicted.latitude.to_radians();
    let lat2 = actual.latitude.to_radians();
    let d_lat = (actual.latitude - predicted.latitude).to_radians();
    let d_lon = (actual.longitude - predicted.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] near antipodes
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let horizontal = EARTH_MEAN_RADIUS * c;

    let vertical = (actual.altitude - predicted.altitude) * METERS_PER_KM;

    horizontal.hypot(vertical)
}

/// Outcome of a batch validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    /// Objects validated, with their error in meters
    pub errors: Vec<(ObjectId, Meter)>,
    /// Objects skipped for lack of estimate or reference
    pub skipped: Vec<ObjectId>,
    /// Validated objects with an error under the threshold
    pub under_threshold: usize,
}

impl ValidationSummary {
    pub fn validated(&self) -> usize {
        self.errors.len()
    }

    /// Share of validated objects under the threshold, `None` when nothing was validated.
    pub fn fraction_under_threshold(&self) -> Option<f64> {
        (!self.errors.is_empty()).then(|| self.under_threshold as f64 / self.errors.len() as f64)
    }
}

/// Aggregate statistics over stored validation results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationStatistics {
    pub count: usize,
    /// Mean error in meters, `None` when `count == 0`
    pub average_error: Option<Meter>,
    /// Share of results under the threshold, `0.0` when `count == 0`
    pub fraction_under_threshold: f64,
}

/// Validator working on a borrowed store and integrity status.
pub struct Validator<'a, S: TrackingStore> {
    store: &'a mut S,
    integrity: &'a mut DataIntegrity,
    threshold: Meter,
}

impl<'a, S: TrackingStore> Validator<'a, S> {
    /// Arguments
    /// -----------------
    /// * `store`: where estimates are read and results written.
    /// * `integrity`: status updated for [`DataSource::ReferenceEphemeris`].
    /// * `threshold`: error (m) under which a validation counts as a success.
    pub fn new(store: &'a mut S, integrity: &'a mut DataIntegrity, threshold: Meter) -> Self {
        Validator {
            store,
            integrity,
            threshold,
        }
    }

    /// Validate the latest stored estimate of `object_id`.
    ///
    /// Arguments
    /// -----------------
    /// * `reference`: provider of the reference position.
    /// * `object_id`: object to validate.
    /// * `at`: timestamp of the written result.
    ///
    /// Return
    /// ----------
    /// * `Some(error)` in meters after persisting a [`ValidationResult`] tagged with the
    ///   estimate's method.
    /// * `None` when there is no stored estimate or no reference position; nothing is written.
    pub fn validate(
        &mut self,
        reference: &impl ReferenceEphemerisProvider,
        object_id: &str,
        at: Epoch,
    ) -> Option<Meter> {
        let predicted = self.store.get_latest_position(object_id)?;
        let actual = reference.reference_position(object_id)?;

        let error_distance = haversine_3d(&predicted.geodetic, &actual.geodetic);

        self.store.create_validation_result(ValidationResult {
            object_id: object_id.to_string(),
            timestamp: at,
            predicted: predicted.geodetic,
            actual: actual.geodetic,
            error_distance,
            method: predicted.method,
        });

        Some(error_distance)
    }

    /// Validate every stored satellite.
    ///
    /// The reference-ephemeris integrity status is marked real when at least one reference
    /// position was found, unavailable otherwise.
    pub fn run_validation(
        &mut self,
        reference: &impl ReferenceEphemerisProvider,
        at: Epoch,
    ) -> ValidationSummary {
        info!("running validation against {}", reference.name());

        let mut summary = ValidationSummary {
            errors: Vec::new(),
            skipped: Vec::new(),
            under_threshold: 0,
        };

        for satellite in self.store.get_satellites() {
            match self.validate(reference, &satellite.object_id, at) {
                Some(error) => {
                    info!("{}: ±{:.0} m", satellite.name, error);
                    if error < self.threshold {
                        summary.under_threshold += 1;
                    }
                    summary.errors.push((satellite.object_id, error));
                }
                None => summary.skipped.push(satellite.object_id),
            }
        }

        if summary.errors.is_empty() {
            self.integrity.mark_unavailable(
                DataSource::ReferenceEphemeris,
                &format!("{} has no usable reference position", reference.name()),
                at,
            );
        } else {
            self.integrity
                .mark_real(DataSource::ReferenceEphemeris, reference.name(), at);
        }

        if summary.validated() == 0 {
            warn!("validation complete: nothing validated");
        } else {
            info!(
                "validation complete: {}/{} objects under {:.0} m",
                summary.under_threshold,
                summary.validated(),
                self.threshold
            );
        }

        summary
    }
}

/// Aggregate statistics over every validation result in `store`.
pub fn validation_statistics(store: &impl TrackingStore, threshold: Meter) -> ValidationStatistics {
    let results = store.get_validation_results(None, None);
    let count = results.len();
    if count == 0 {
        return ValidationStatistics {
            count: 0,
            average_error: None,
            fraction_under_threshold: 0.0,
        };
    }

    let total: f64 = results.iter().map(|r| r.error_distance).sum();
    let under = results
        .iter()
        .filter(|r| r.error_distance < threshold)
        .count();

    ValidationStatistics {
        count,
        average_error: Some(total / count as f64),
        fraction_under_threshold: under as f64 / count as f64,
    }
}
