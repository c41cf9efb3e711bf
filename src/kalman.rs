//! # Per-object recursive state estimator
//!
//! A reduced Kalman filter smoothing the successive propagated states of one tracked object.
//!
//! ## Model
//!
//! The covariance is kept **diagonal-only** ([`FilterState::covariance`] is a `Vector6` holding
//! `[σ²x, σ²y, σ²z, σ²vx, σ²vy, σ²vz]`): cross-axis correlations are never represented, and every
//! gain is a scalar computed independently per axis:
//!
//! ```text
//! predict:  x ← propagated state,            P_i ← P_i + q·dt
//! update:   y_i = z_i − x_i
//!           g_i = P_i / (P_i + R)
//!           x_i ← x_i + g_i·y_i,             P_i ← P_i·(1 − g_i)
//! ```
//!
//! The prediction does not evolve the estimate with its own process model: the
//! [`EnhancedPropagator`](crate::propagator::EnhancedPropagator) output **is** the prediction.
//! The measurement given to [`SatelliteKalmanFilter::update`] is that same propagated state,
//! so the filter smooths consecutive propagations rather than fusing independent sensors.
//!
//! ## Ownership
//!
//! [`FilterBank`] is the object-id keyed store of filters. A filter is created on the first
//! observation of an object and is only reachable through `&mut FilterBank`, so no two callers
//! can mutate the same [`FilterState`] concurrently.

use std::collections::HashMap;

use log::debug;
use nalgebra::{Vector3, Vector6};

use crate::constants::{Meter, ObjectId, Seconds};
use crate::state::OrbitState;

/// Initial position variance in m²
pub const INITIAL_POSITION_VARIANCE: f64 = 1e6;

/// Initial velocity variance in (m/s)²
pub const INITIAL_VELOCITY_VARIANCE: f64 = 1e3;

/// Default process noise rate added to each variance per second
pub const DEFAULT_PROCESS_NOISE: f64 = 1e-6;

/// Best estimate and diagonal covariance of one tracked object.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Diagonal of the 6×6 covariance: three position variances (m²), then three velocity
    /// variances ((m/s)²). Every entry stays ≥ 0.
    pub covariance: Vector6<f64>,
}

/// Diagonal covariance filter for a single object.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteKalmanFilter {
    state: FilterState,
    process_noise: f64,
}

impl SatelliteKalmanFilter {
    /// Seed a filter from the first propagated state of an object.
    pub fn new(initial: &OrbitState) -> Self {
        Self::with_process_noise(initial, DEFAULT_PROCESS_NOISE)
    }

    pub fn with_process_noise(initial: &OrbitState, process_noise: f64) -> Self {
        Self {
            state: FilterState {
                position: initial.position,
                velocity: initial.velocity,
                covariance: Self::initialize_covariance(),
            },
            process_noise,
        }
    }

    /// Initial diagonal: 1e6 m² on position axes, 1e3 (m/s)² on velocity axes.
    pub fn initialize_covariance() -> Vector6<f64> {
        Vector6::new(
            INITIAL_POSITION_VARIANCE,
            INITIAL_POSITION_VARIANCE,
            INITIAL_POSITION_VARIANCE,
            INITIAL_VELOCITY_VARIANCE,
            INITIAL_VELOCITY_VARIANCE,
            INITIAL_VELOCITY_VARIANCE,
        )
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn process_noise(&self) -> f64 {
        self.process_noise
    }

    /// Prediction step.
    ///
    /// Arguments
    /// -----------------
    /// * `dt`: elapsed time in seconds used to inflate the covariance.
    /// * `propagated`: propagator output, copied as the new estimate.
    ///
    /// A negative `dt` would shrink the variances; each entry is kept at or above zero.
    pub fn predict(&mut self, dt: Seconds, propagated: &OrbitState) {
        self.state.position = propagated.position;
        self.state.velocity = propagated.velocity;

        let inflation = self.process_noise * dt;
        self.state
            .covariance
            .apply(|variance| *variance = (*variance + inflation).max(0.0));
    }

    /// Correction step.
    ///
    /// Arguments
    /// -----------------
    /// * `measurement`: observed state; its timestamp stamps the returned estimate.
    /// * `measurement_uncertainty`: variance `R` shared by the six axes.
    ///
    /// Return
    /// ----------
    /// * The fused [`OrbitState`].
    pub fn update(&mut self, measurement: &OrbitState, measurement_uncertainty: f64) -> OrbitState {
        let estimate = self.stacked_state();
        let observed = Vector6::new(
            measurement.position.x,
            measurement.position.y,
            measurement.position.z,
            measurement.velocity.x,
            measurement.velocity.y,
            measurement.velocity.z,
        );
        let innovation = observed - estimate;
        let gain = self.kalman_gain(measurement_uncertainty);

        let fused = estimate + gain.component_mul(&innovation);
        self.state.position = fused.fixed_rows::<3>(0).into_owned();
        self.state.velocity = fused.fixed_rows::<3>(3).into_owned();

        self.state
            .covariance
            .zip_apply(&gain, |variance, g| *variance *= 1.0 - g);

        debug!(
            "filter update: |innovation pos|={:.3} m, uncertainty={:.3} m",
            innovation.fixed_rows::<3>(0).norm(),
            self.uncertainty()
        );

        OrbitState::new(self.state.position, self.state.velocity, measurement.timestamp)
    }

    /// Per-axis scalar gains `P_i / (P_i + R)`.
    ///
    /// An axis whose innovation variance is not strictly positive gets a zero gain, and so does
    /// every axis when `R` is negative or not finite. Gains stay within `[0, 1]`.
    fn kalman_gain(&self, measurement_uncertainty: f64) -> Vector6<f64> {
        if !(measurement_uncertainty >= 0.0 && measurement_uncertainty.is_finite()) {
            return Vector6::zeros();
        }
        self.state.covariance.map(|variance| {
            let innovation_variance = variance + measurement_uncertainty;
            if innovation_variance > 0.0 {
                (variance / innovation_variance).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
    }

    fn stacked_state(&self) -> Vector6<f64> {
        let p = &self.state.position;
        let v = &self.state.velocity;
        Vector6::new(p.x, p.y, p.z, v.x, v.y, v.z)
    }

    /// Position uncertainty `sqrt(σ²x + σ²y + σ²z)` in meters.
    pub fn uncertainty(&self) -> Meter {
        self.state.covariance.fixed_rows::<3>(0).sum().sqrt()
    }
}

/// Object-id keyed store of filters.
///
/// Entries are created lazily on first observation; eviction is left to the owner.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: HashMap<ObjectId, SatelliteKalmanFilter>,
    process_noise: f64,
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE)
    }
}

impl FilterBank {
    pub fn new(process_noise: f64) -> Self {
        Self {
            filters: HashMap::new(),
            process_noise,
        }
    }

    /// Feed one propagated state of `object_id` through its filter.
    ///
    /// On the first observation the filter is seeded and the propagated state is returned
    /// unchanged. Afterwards the filter runs `predict(dt, propagated)` then
    /// `update(propagated, measurement_uncertainty)`.
    ///
    /// Arguments
    /// -----------------
    /// * `object_id`: identifier of the tracked object.
    /// * `dt`: seconds between the initial state and the propagated state.
    /// * `propagated`: latest propagator output.
    /// * `measurement_uncertainty`: variance given to the update step.
    ///
    /// Return
    /// ----------
    /// * The smoothed state for this cycle.
    pub fn observe(
        &mut self,
        object_id: &str,
        dt: Seconds,
        propagated: &OrbitState,
        measurement_uncertainty: f64,
    ) -> OrbitState {
        match self.filters.get_mut(object_id) {
            Some(filter) => {
                filter.predict(dt, propagated);
                filter.update(propagated, measurement_uncertainty)
            }
            None => {
                debug!("seeding filter for object {object_id}");
                self.filters.insert(
                    object_id.to_string(),
                    SatelliteKalmanFilter::with_process_noise(propagated, self.process_noise),
                );
                *propagated
            }
        }
    }

    pub fn get(&self, object_id: &str) -> Option<&SatelliteKalmanFilter> {
        self.filters.get(object_id)
    }

    /// Drop the filter of an object no longer tracked.
    pub fn remove(&mut self, object_id: &str) -> Option<SatelliteKalmanFilter> {
        self.filters.remove(object_id)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
