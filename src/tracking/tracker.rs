//! # Satellite tracker
//!
//! [`SatelliteTracker`] owns everything that lives across update cycles: the per-object
//! [`FilterBank`], the [`DataIntegrity`] status and the [`TrackingStore`]. It is the only
//! writer of position records.
//!
//! A cycle is driven by [`SatelliteTracker::update_cycle`]; each object is processed by
//! [`SatelliteTracker::process_element_set`]. A failure for one object (unreadable element
//! set, SGP4 error, non-finite state) is logged and reported in the [`CycleReport`] without
//! stopping the other objects.
//!
//! The read side, [`SatelliteTracker::satellite_position`], returns a tagged
//! [`PositionReport`] instead of an optional loosely-shaped value.

use hifitime::Epoch;
use log::{debug, info, warn};

use crate::constants::{Meter, ObjectId};
use crate::integrity::{DataIntegrity, DataSource};
use crate::kalman::FilterBank;
use crate::propagator::{cartesian_to_geodetic, estimate_accuracy, EnhancedPropagator};
use crate::providers::sgp4_source::Sgp4StateSource;
use crate::providers::{
    ElementSet, ElementSetProvider, InitialStateSource, ReferenceEphemerisProvider,
    SpaceWeatherProvider,
};
use crate::sattrack_errors::SatTrackError;
use crate::state::{EnvironmentalData, GeodeticPosition, SatelliteParameters};
use crate::storage::{PositionRecord, SatelliteRecord, SpaceWeatherRecord, TrackingStore};
use crate::tracking::TrackerParams;
use crate::validation::{ValidationSummary, Validator};

/// Confidence level attached to published accuracy estimates, in percent.
pub const ACCURACY_CONFIDENCE: f64 = 95.0;

/// Outcome of one update cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub timestamp: Epoch,
    /// Space weather used by the cycle, `None` when unavailable
    pub environment: Option<EnvironmentalData>,
    /// Objects with a new position record
    pub processed: Vec<ObjectId>,
    /// Objects whose element set was received but could not be processed
    pub failed: Vec<(ObjectId, SatTrackError)>,
    /// Tracked objects without an element set this cycle
    pub missing: Vec<ObjectId>,
}

/// Latest published position of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPosition {
    pub object_id: ObjectId,
    pub name: String,
    pub geodetic: GeodeticPosition,
    /// Velocity in m/s
    pub velocity: [f64; 3],
    /// Estimated error in meters
    pub accuracy_m: Meter,
    /// Confidence level of `accuracy_m` in percent
    pub confidence: f64,
    pub method: String,
    pub timestamp: Epoch,
}

/// Why no position can be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    UnknownSatellite,
    NoPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionReport {
    Position(TrackedPosition),
    Unavailable(UnavailableReason),
}

/// Tracking orchestrator.
///
/// `S` is the persistence backend and `I` converts element sets to initial states
/// ([`Sgp4StateSource`] by default).
#[derive(Debug)]
pub struct SatelliteTracker<S: TrackingStore, I: InitialStateSource = Sgp4StateSource> {
    params: TrackerParams,
    propagator: EnhancedPropagator,
    filters: FilterBank,
    integrity: DataIntegrity,
    state_source: I,
    store: S,
}

impl<S: TrackingStore> SatelliteTracker<S, Sgp4StateSource> {
    pub fn new(params: TrackerParams, store: S) -> Self {
        Self::with_state_source(params, store, Sgp4StateSource::new())
    }
}

impl<S: TrackingStore, I: InitialStateSource> SatelliteTracker<S, I> {
    pub fn with_state_source(params: TrackerParams, store: S, state_source: I) -> Self {
        SatelliteTracker {
            filters: FilterBank::new(params.process_noise),
            params,
            propagator: EnhancedPropagator::new(),
            integrity: DataIntegrity::new(),
            state_source,
            store,
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn filters(&self) -> &FilterBank {
        &self.filters
    }

    pub fn integrity(&self) -> &DataIntegrity {
        &self.integrity
    }

    /// Start requesting `object_id` in the next cycles.
    pub fn track(&mut self, object_id: impl Into<ObjectId>) {
        let object_id = object_id.into();
        if !self.params.tracked_objects.contains(&object_id) {
            self.params.tracked_objects.push(object_id);
        }
    }

    /// Stop requesting `object_id` and drop its filter. Stored records are kept.
    ///
    /// Return
    /// ----------
    /// * `true` if the object was tracked.
    pub fn untrack(&mut self, object_id: &str) -> bool {
        let before = self.params.tracked_objects.len();
        self.params.tracked_objects.retain(|id| id != object_id);
        self.filters.remove(object_id);
        self.params.tracked_objects.len() != before
    }

    /// Run one full update cycle at instant `at`.
    ///
    /// Space weather is fetched first so that every object of the cycle sees the same
    /// environment. Element sets are then requested for all tracked objects and processed one
    /// at a time.
    ///
    /// Arguments
    /// -----------------
    /// * `at`: instant of the cycle, used as propagation target and record timestamp.
    /// * `element_sets`: element-set provider.
    /// * `space_weather`: space-weather provider.
    ///
    /// Return
    /// ----------
    /// * A [`CycleReport`]. Provider failures only degrade the cycle; they are recorded in the
    ///   integrity status, never returned as an error.
    pub async fn update_cycle(
        &mut self,
        at: Epoch,
        element_sets: &impl ElementSetProvider,
        space_weather: &impl SpaceWeatherProvider,
    ) -> CycleReport {
        info!("update cycle at {at}");

        let environment = self.refresh_space_weather(at, space_weather).await;

        let sets = match element_sets
            .fetch_element_sets(&self.params.tracked_objects)
            .await
        {
            Ok(sets) if !sets.is_empty() => {
                self.integrity
                    .mark_real(DataSource::ElementSets, element_sets.name(), at);
                sets
            }
            Ok(_) => {
                self.integrity.mark_unavailable(
                    DataSource::ElementSets,
                    &format!("{} returned no element set", element_sets.name()),
                    at,
                );
                Vec::new()
            }
            Err(e) => {
                self.integrity
                    .mark_unavailable(DataSource::ElementSets, &e.to_string(), at);
                Vec::new()
            }
        };

        let mut report = CycleReport {
            timestamp: at,
            environment,
            processed: Vec::new(),
            failed: Vec::new(),
            missing: Vec::new(),
        };

        for set in &sets {
            match self.process_element_set(set, at, environment.as_ref()) {
                Ok(_) => report.processed.push(set.object_id.clone()),
                Err(e) => {
                    warn!("skipping object {}: {e}", set.object_id);
                    report.failed.push((set.object_id.clone(), e));
                }
            }
        }

        report.missing = self
            .params
            .tracked_objects
            .iter()
            .filter(|id| !sets.iter().any(|set| &set.object_id == *id))
            .cloned()
            .collect();
        if !report.missing.is_empty() {
            debug!("no element set for {:?}", report.missing);
        }

        self.integrity.report();
        info!(
            "cycle done: {} processed, {} failed, {} missing",
            report.processed.len(),
            report.failed.len(),
            report.missing.len()
        );

        report
    }

    async fn refresh_space_weather(
        &mut self,
        at: Epoch,
        provider: &impl SpaceWeatherProvider,
    ) -> Option<EnvironmentalData> {
        match provider.fetch_current().await {
            Ok(report) => {
                self.integrity
                    .mark_real(DataSource::SpaceWeather, provider.name(), at);
                self.store.create_space_weather(SpaceWeatherRecord {
                    timestamp: at,
                    solar_flux: report.solar_flux,
                    kp_index: report.kp_index,
                    ap_index: report.ap_index,
                    dst_index: report.dst_index,
                    source: provider.name().to_string(),
                });
                Some(report.environmental_data())
            }
            Err(e) => {
                self.integrity
                    .mark_unavailable(DataSource::SpaceWeather, &e.to_string(), at);
                None
            }
        }
    }

    /// Process one element set: store the satellite, propagate to `at`, filter, score and
    /// persist the position.
    ///
    /// Physical parameters come from the stored satellite record, if any; missing values are
    /// defaulted inside the propagator only.
    ///
    /// Arguments
    /// -----------------
    /// * `set`: latest element set of the object.
    /// * `at`: target instant.
    /// * `env`: space weather of the cycle, `None` when unavailable.
    ///
    /// Return
    /// ----------
    /// * The stored [`PositionRecord`], or an error when the element set cannot be read, SGP4
    ///   fails, or the propagated or filtered state is not finite. On a non-finite state the
    ///   object's filter is left untouched (propagation) or dropped (filtering) and nothing is
    ///   stored.
    pub fn process_element_set(
        &mut self,
        set: &ElementSet,
        at: Epoch,
        env: Option<&EnvironmentalData>,
    ) -> Result<PositionRecord, SatTrackError> {
        let elements = set.mean_elements()?;
        let sat_params = self
            .store
            .get_satellite(&set.object_id)
            .map(|existing| existing.params)
            .unwrap_or_default();

        self.store.upsert_satellite(SatelliteRecord {
            object_id: set.object_id.clone(),
            name: set.name.clone(),
            line1: set.line1.clone(),
            line2: set.line2.clone(),
            epoch: set.epoch,
            elements,
            params: sat_params,
            last_updated: at,
        });

        let initial = self.state_source.initial_state(set)?;
        let propagated = self.propagator.propagate(&initial, at, &sat_params, env);
        if !propagated.is_finite() {
            return Err(SatTrackError::NonFiniteState(set.object_id.clone()));
        }

        let dt = (at - initial.timestamp).to_seconds();
        let filtered = self.filters.observe(
            &set.object_id,
            dt,
            &propagated,
            self.params.measurement_uncertainty,
        );
        if !filtered.is_finite() {
            self.filters.remove(&set.object_id);
            return Err(SatTrackError::NonFiniteState(set.object_id.clone()));
        }

        let accuracy = estimate_accuracy(
            (at - set.epoch).to_seconds(),
            &self.params.accuracy_method,
            env.is_some(),
            sat_params.is_complete(),
        );

        let record = PositionRecord {
            object_id: set.object_id.clone(),
            timestamp: at,
            geodetic: cartesian_to_geodetic(&filtered.position),
            velocity: [filtered.velocity.x, filtered.velocity.y, filtered.velocity.z],
            accuracy_estimate: accuracy,
            method: self.params.stored_method.clone(),
        };
        debug!(
            "object {}: alt {:.1} km, accuracy {accuracy:.0} m",
            set.object_id, record.geodetic.altitude
        );
        self.store.create_position(record.clone());

        Ok(record)
    }

    /// Record the physical parameters of an already stored satellite.
    ///
    /// Return
    /// ----------
    /// * [`SatTrackError::UnknownObject`] when the object has never been stored.
    pub fn set_satellite_parameters(
        &mut self,
        object_id: &str,
        params: SatelliteParameters,
    ) -> Result<(), SatTrackError> {
        let mut record = self
            .store
            .get_satellite(object_id)
            .ok_or_else(|| SatTrackError::UnknownObject(object_id.to_string()))?;
        record.params = params;
        self.store.upsert_satellite(record);
        Ok(())
    }

    /// Latest published position of `object_id`.
    pub fn satellite_position(&self, object_id: &str) -> PositionReport {
        let Some(satellite) = self.store.get_satellite(object_id) else {
            return PositionReport::Unavailable(UnavailableReason::UnknownSatellite);
        };
        let Some(position) = self.store.get_latest_position(object_id) else {
            return PositionReport::Unavailable(UnavailableReason::NoPosition);
        };

        PositionReport::Position(TrackedPosition {
            object_id: position.object_id,
            name: satellite.name,
            geodetic: position.geodetic,
            velocity: position.velocity,
            accuracy_m: position.accuracy_estimate,
            confidence: ACCURACY_CONFIDENCE,
            method: position.method,
            timestamp: position.timestamp,
        })
    }

    /// Validate the latest stored estimate of `object_id` against `reference`.
    ///
    /// See [`Validator::validate`].
    pub fn validate(
        &mut self,
        reference: &impl ReferenceEphemerisProvider,
        object_id: &str,
        at: Epoch,
    ) -> Option<Meter> {
        Validator::new(&mut self.store, &mut self.integrity, self.params.validation_threshold)
            .validate(reference, object_id, at)
    }

    /// Validate every stored satellite against `reference`.
    ///
    /// See [`Validator::run_validation`].
    pub fn run_validation(
        &mut self,
        reference: &impl ReferenceEphemerisProvider,
        at: Epoch,
    ) -> ValidationSummary {
        Validator::new(&mut self.store, &mut self.integrity, self.params.validation_threshold)
            .run_validation(reference, at)
    }
}
