//! # Tracking records and persistence
//!
//! Records written and read by the tracker and the validator, the [`TrackingStore`] trait
//! through which they are persisted, and [`MemStorage`], an in-memory implementation.
//!
//! The tracker is the only writer of [`PositionRecord`]s and [`ValidationResult`]s. Records are
//! append-only: a stored position or validation result is never modified afterwards.

use std::collections::{HashMap, HashSet};

use hifitime::Epoch;

use crate::constants::{Meter, ObjectId};
use crate::providers::MeanElements;
use crate::state::{GeodeticPosition, SatelliteParameters};

/// Number of most recent validation results averaged by [`TrackingStore::system_stats`].
pub const STATS_VALIDATION_WINDOW: usize = 100;

/// A tracked object and its latest element set.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteRecord {
    pub object_id: ObjectId,
    pub name: String,
    pub line1: String,
    pub line2: String,
    pub epoch: Epoch,
    pub elements: MeanElements,
    /// Physical properties as known, never filled with defaults
    pub params: SatelliteParameters,
    pub last_updated: Epoch,
}

/// Stored position estimate of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub object_id: ObjectId,
    pub timestamp: Epoch,
    pub geodetic: GeodeticPosition,
    /// Velocity in m/s
    pub velocity: [f64; 3],
    /// Estimated error in meters
    pub accuracy_estimate: Meter,
    pub method: String,
}

/// Stored space-weather snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceWeatherRecord {
    pub timestamp: Epoch,
    pub solar_flux: f64,
    pub kp_index: f64,
    pub ap_index: f64,
    pub dst_index: Option<f64>,
    pub source: String,
}

/// Comparison between a stored estimate and a reference position.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub object_id: ObjectId,
    pub timestamp: Epoch,
    pub predicted: GeodeticPosition,
    pub actual: GeodeticPosition,
    /// 3-D distance between `predicted` and `actual` in meters
    pub error_distance: Meter,
    pub method: String,
}

/// Aggregate counters of a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStats {
    pub total_satellites: usize,
    /// Mean error of the most recent validation results, `None` without any
    pub avg_accuracy: Option<Meter>,
    /// Distinct objects with at least one validation result
    pub validated_satellites: usize,
}

/// Persistence used by the tracker and the validator.
///
/// Histories are returned newest first.
pub trait TrackingStore {
    fn get_satellite(&self, object_id: &str) -> Option<SatelliteRecord>;

    fn get_satellites(&self) -> Vec<SatelliteRecord>;

    /// Insert or replace the record keyed by `record.object_id`.
    fn upsert_satellite(&mut self, record: SatelliteRecord);

    fn get_latest_position(&self, object_id: &str) -> Option<PositionRecord>;

    fn get_position_history(&self, object_id: &str, limit: usize) -> Vec<PositionRecord>;

    fn create_position(&mut self, record: PositionRecord);

    fn get_latest_space_weather(&self) -> Option<SpaceWeatherRecord>;

    fn create_space_weather(&mut self, record: SpaceWeatherRecord);

    /// Validation results, optionally restricted to one object and to the `limit` newest.
    fn get_validation_results(
        &self,
        object_id: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<ValidationResult>;

    fn create_validation_result(&mut self, record: ValidationResult);

    fn system_stats(&self) -> SystemStats;
}

/// In-memory [`TrackingStore`].
#[derive(Debug, Clone, Default)]
pub struct MemStorage {
    satellites: HashMap<ObjectId, SatelliteRecord>,
    /// Per object, oldest first
    positions: HashMap<ObjectId, Vec<PositionRecord>>,
    space_weather: Vec<SpaceWeatherRecord>,
    validations: Vec<ValidationResult>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingStore for MemStorage {
    fn get_satellite(&self, object_id: &str) -> Option<SatelliteRecord> {
        self.satellites.get(object_id).cloned()
    }

    fn get_satellites(&self) -> Vec<SatelliteRecord> {
        let mut satellites: Vec<_> = self.satellites.values().cloned().collect();
        satellites.sort_by(|a, b| a.object_id.cmp(&b.object_id));
        satellites
    }

    fn upsert_satellite(&mut self, record: SatelliteRecord) {
        self.satellites.insert(record.object_id.clone(), record);
    }

    fn get_latest_position(&self, object_id: &str) -> Option<PositionRecord> {
        self.positions
            .get(object_id)
            .and_then(|history| history.last())
            .cloned()
    }

    fn get_position_history(&self, object_id: &str, limit: usize) -> Vec<PositionRecord> {
        self.positions
            .get(object_id)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn create_position(&mut self, record: PositionRecord) {
        self.positions
            .entry(record.object_id.clone())
            .or_default()
            .push(record);
    }

    fn get_latest_space_weather(&self) -> Option<SpaceWeatherRecord> {
        self.space_weather.last().cloned()
    }

    fn create_space_weather(&mut self, record: SpaceWeatherRecord) {
        self.space_weather.push(record);
    }

    fn get_validation_results(
        &self,
        object_id: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<ValidationResult> {
        self.validations
            .iter()
            .rev()
            .filter(|v| object_id.map_or(true, |id| v.object_id == id))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn create_validation_result(&mut self, record: ValidationResult) {
        self.validations.push(record);
    }

    fn system_stats(&self) -> SystemStats {
        let recent: Vec<Meter> = self
            .validations
            .iter()
            .rev()
            .take(STATS_VALIDATION_WINDOW)
            .map(|v| v.error_distance)
            .collect();

        let avg_accuracy =
            (!recent.is_empty()).then(|| recent.iter().sum::<f64>() / recent.len() as f64);

        let validated_satellites = self
            .validations
            .iter()
            .map(|v| v.object_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        SystemStats {
            total_satellites: self.satellites.len(),
            avg_accuracy,
            validated_satellites,
        }
    }
}
