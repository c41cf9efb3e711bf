//! # Tracking
//!
//! Orchestration of the per-object pipeline and its configuration.
//!
//! ## Overview
//!
//! Every update cycle, for each tracked object:
//!
//! 1. the latest element set is fetched and turned into an initial Cartesian state,
//! 2. the state is propagated to the cycle instant with the
//!    [`EnhancedPropagator`](crate::propagator::EnhancedPropagator),
//! 3. the object's filter in the [`FilterBank`](crate::kalman::FilterBank) smooths it,
//! 4. accuracy is scored and a [`PositionRecord`](crate::storage::PositionRecord) persisted.
//!
//! Space weather is fetched once per cycle, before any object is processed. When it is
//! unavailable the cycle still runs, without the drag term and without the space-weather
//! accuracy credit.
//!
//! ## Sub-modules
//!
//! * [`tracker`] – [`SatelliteTracker`](tracker::SatelliteTracker) and the read-side
//!   [`PositionReport`](tracker::PositionReport).
//! * [`scheduler`] – periodic driver running one cycle per interval.
//!
//! ## Configuration
//!
//! All tunables live in [`TrackerParams`], built with [`TrackerParams::builder`]:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sattrack::tracking::TrackerParams;
//!
//! let params = TrackerParams::builder()
//!     .update_interval(Duration::from_secs(15 * 60))
//!     .measurement_uncertainty(500.0)
//!     .tracked_objects(vec!["25544".into()])
//!     .build()
//!     .unwrap();
//! println!("{params:#}");
//! ```

use std::cmp::Ordering::{Equal, Greater};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{Meter, ObjectId, METHOD_ENHANCED, METHOD_ENHANCED_KALMAN};
use crate::kalman::DEFAULT_PROCESS_NOISE;
use crate::sattrack_errors::SatTrackError;

pub mod scheduler;
pub mod tracker;

/// Objects tracked when no list is configured (ISS, Sentinel-1A and other well-known LEO
/// objects).
pub const DEFAULT_TRACKED_OBJECTS: [&str; 7] =
    ["25544", "28654", "33591", "39634", "43013", "48274", "49260"];

/// Configuration of the tracker, the filters and validation.
///
/// Fields
/// -----------------
/// * `update_interval` – time between two update cycles.
/// * `measurement_uncertainty` – value handed to the filter update step.
/// * `process_noise` – covariance inflation rate of new filters.
/// * `accuracy_method` – method tag used when scoring accuracy.
/// * `stored_method` – method tag written on position records.
/// * `validation_threshold` – error (m) under which a validation counts as a success.
/// * `tracked_objects` – object ids requested from the element-set provider.
///
/// Defaults
/// -----------------
/// * `update_interval`: 30 min
/// * `measurement_uncertainty`: 1000
/// * `process_noise`: 1e-6
/// * `accuracy_method`: `"enhanced"`
/// * `stored_method`: `"enhanced+kalman"`
/// * `validation_threshold`: 300 m
/// * `tracked_objects`: [`DEFAULT_TRACKED_OBJECTS`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerParams {
    pub update_interval: Duration,
    pub measurement_uncertainty: f64,
    pub process_noise: f64,
    pub accuracy_method: String,
    pub stored_method: String,
    pub validation_threshold: Meter,
    pub tracked_objects: Vec<ObjectId>,
}

impl TrackerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> TrackerParamsBuilder {
        TrackerParamsBuilder::new()
    }
}

impl Default for TrackerParams {
    fn default() -> Self {
        TrackerParams {
            update_interval: Duration::from_secs(30 * 60),
            measurement_uncertainty: 1000.0,
            process_noise: DEFAULT_PROCESS_NOISE,
            accuracy_method: METHOD_ENHANCED.to_string(),
            stored_method: METHOD_ENHANCED_KALMAN.to_string(),
            validation_threshold: 300.0,
            tracked_objects: DEFAULT_TRACKED_OBJECTS
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

/// Builder for [`TrackerParams`], with validation.
#[derive(Debug, Clone)]
pub struct TrackerParamsBuilder {
    params: TrackerParams,
}

impl Default for TrackerParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: TrackerParams::default(),
        }
    }

    pub fn update_interval(mut self, v: Duration) -> Self {
        self.params.update_interval = v;
        self
    }
    pub fn measurement_uncertainty(mut self, v: f64) -> Self {
        self.params.measurement_uncertainty = v;
        self
    }
    pub fn process_noise(mut self, v: f64) -> Self {
        self.params.process_noise = v;
        self
    }
    pub fn accuracy_method(mut self, v: impl Into<String>) -> Self {
        self.params.accuracy_method = v.into();
        self
    }
    pub fn stored_method(mut self, v: impl Into<String>) -> Self {
        self.params.stored_method = v.into();
        self
    }
    pub fn validation_threshold(mut self, v: Meter) -> Self {
        self.params.validation_threshold = v;
        self
    }
    pub fn tracked_objects(mut self, v: Vec<ObjectId>) -> Self {
        self.params.tracked_objects = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(TrackerParams)` when every value is usable.
    /// * `Err(SatTrackError::InvalidTrackerParameter)` otherwise: the interval must be non-zero,
    ///   the measurement uncertainty and the validation threshold strictly positive, the process
    ///   noise non-negative and both method tags non-empty.
    pub fn build(self) -> Result<TrackerParams, SatTrackError> {
        let p = &self.params;

        if p.update_interval.is_zero() {
            return Err(SatTrackError::InvalidTrackerParameter(
                "update_interval must be > 0".into(),
            ));
        }
        if !Self::gt0(p.measurement_uncertainty) {
            return Err(SatTrackError::InvalidTrackerParameter(
                "measurement_uncertainty must be > 0".into(),
            ));
        }
        if !Self::ge0(p.process_noise) {
            return Err(SatTrackError::InvalidTrackerParameter(
                "process_noise must be >= 0".into(),
            ));
        }
        if !Self::gt0(p.validation_threshold) {
            return Err(SatTrackError::InvalidTrackerParameter(
                "validation_threshold must be > 0".into(),
            ));
        }
        if p.accuracy_method.is_empty() || p.stored_method.is_empty() {
            return Err(SatTrackError::InvalidTrackerParameter(
                "method tags must not be empty".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for TrackerParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 46;
            writeln!(f, "Tracker Parameters")?;
            writeln!(f, "------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!(
                "update_interval         = {} s",
                self.update_interval.as_secs(),
                "Time between update cycles"
            )?;
            line!(
                "measurement_uncertainty = {:.1}",
                self.measurement_uncertainty,
                "Filter update noise"
            )?;
            line!(
                "process_noise           = {:.1e}",
                self.process_noise,
                "Covariance inflation per second"
            )?;
            line!(
                "accuracy_method         = {}",
                self.accuracy_method,
                "Tag used for accuracy scoring"
            )?;
            line!(
                "stored_method           = {}",
                self.stored_method,
                "Tag written on position records"
            )?;
            line!(
                "validation_threshold    = {:.1} m",
                self.validation_threshold,
                "Success threshold of validation"
            )?;
            line!(
                "tracked_objects         = {}",
                self.tracked_objects.len(),
                "Objects requested per cycle"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "TrackerParams(interval={}s, R={:.1}, q={:.1e}, method={}/{}, threshold={:.1}m, objects={})",
                self.update_interval.as_secs(),
                self.measurement_uncertainty,
                self.process_noise,
                self.accuracy_method,
                self.stored_method,
                self.validation_threshold,
                self.tracked_objects.len(),
            )
        }
    }
}

#[cfg(test)]
mod tracker_params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = TrackerParams::default();
        assert_eq!(params.update_interval, Duration::from_secs(1800));
        assert_eq!(params.measurement_uncertainty, 1000.0);
        assert_eq!(params.process_noise, 1e-6);
        assert_eq!(params.accuracy_method, "enhanced");
        assert_eq!(params.stored_method, "enhanced+kalman");
        assert_eq!(params.validation_threshold, 300.0);
        assert_eq!(params.tracked_objects.len(), 7);
        assert_eq!(TrackerParams::builder().build().unwrap(), params);
    }

    #[test]
    fn test_builder_validation() {
        let zero_interval = TrackerParams::builder()
            .update_interval(Duration::ZERO)
            .build();
        assert_eq!(
            zero_interval,
            Err(SatTrackError::InvalidTrackerParameter(
                "update_interval must be > 0".into()
            ))
        );

        assert!(TrackerParams::builder()
            .measurement_uncertainty(0.0)
            .build()
            .is_err());
        assert!(TrackerParams::builder()
            .process_noise(f64::NAN)
            .build()
            .is_err());
        assert!(TrackerParams::builder()
            .validation_threshold(-1.0)
            .build()
            .is_err());
        assert!(TrackerParams::builder().stored_method("").build().is_err());

        let params = TrackerParams::builder()
            .process_noise(0.0)
            .tracked_objects(vec!["25544".into()])
            .build()
            .unwrap();
        assert_eq!(params.process_noise, 0.0);
        assert_eq!(params.tracked_objects, vec!["25544".to_string()]);
    }

    #[test]
    fn test_display() {
        let params = TrackerParams::default();
        let compact = format!("{params}");
        assert!(compact.starts_with("TrackerParams(interval=1800s"));

        let table = format!("{params:#}");
        assert!(table.contains("update_interval         = 1800 s"));
        assert!(table.contains("# Tag written on position records"));
    }
}
