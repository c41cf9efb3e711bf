//! # External data providers
//!
//! Collaborators consumed by the tracker and the validator:
//!
//! | trait                          | supplies                                  | may suspend |
//! |--------------------------------|-------------------------------------------|-------------|
//! | [`ElementSetProvider`]         | latest element sets of tracked objects    | yes         |
//! | [`SpaceWeatherProvider`]       | current F10.7 / Kp / Ap (/ Dst)           | yes         |
//! | [`ReferenceEphemerisProvider`] | independent reference positions           | no          |
//! | [`InitialStateSource`]         | Cartesian state derived from an element set | no        |
//!
//! In-memory implementations ([`StaticElementSets`], [`StaticSpaceWeather`],
//! [`StaticEphemerides`]) serve hosts that load their data by other means, and tests.
//!
//! Providers never fabricate data: when nothing usable is available they return
//! [`SatTrackError::ProviderUnavailable`] (or `None` for reference positions).
//!
//! ## Sub-modules
//!
//! * [`sgp4_source`] – [`InitialStateSource`] backed by the `sgp4` crate.
//! * `noaa` – NOAA SWPC client (feature `noaa-download`).

use std::collections::HashMap;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, ObjectId};
use crate::sattrack_errors::SatTrackError;
use crate::space_weather::SpaceWeatherReport;
use crate::state::{GeodeticPosition, OrbitState};

#[cfg(feature = "noaa-download")]
pub mod noaa;
pub mod sgp4_source;

/// Mean orbital elements read from the fixed columns of element-set line 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanElements {
    pub inclination: Degree,
    pub raan: Degree,
    pub eccentricity: f64,
    pub arg_of_perigee: Degree,
    pub mean_anomaly: Degree,
    /// Revolutions per day
    pub mean_motion: f64,
}

/// Two-line element set of one tracked object.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSet {
    pub object_id: ObjectId,
    pub name: String,
    pub line1: String,
    pub line2: String,
    /// Instant at which the elements are valid
    pub epoch: Epoch,
}

impl ElementSet {
    pub fn new(
        object_id: impl Into<ObjectId>,
        name: impl Into<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
        epoch: Epoch,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            name: name.into(),
            line1: line1.into(),
            line2: line2.into(),
            epoch,
        }
    }

    /// Read the mean elements from line 2.
    ///
    /// Columns (0-based, end exclusive): inclination `8..16`, RAAN `17..25`, eccentricity
    /// `26..33` with an implied leading `0.`, argument of perigee `34..42`, mean anomaly
    /// `43..51`, mean motion `52..63`.
    ///
    /// Return
    /// ----------
    /// * [`MeanElements`], or [`SatTrackError::InvalidElementSet`] when line 2 is too short
    ///   or a field is not a number.
    pub fn mean_elements(&self) -> Result<MeanElements, SatTrackError> {
        Ok(MeanElements {
            inclination: self.line2_field(8..16, "inclination")?,
            raan: self.line2_field(17..25, "RAAN")?,
            eccentricity: self.eccentricity()?,
            arg_of_perigee: self.line2_field(34..42, "argument of perigee")?,
            mean_anomaly: self.line2_field(43..51, "mean anomaly")?,
            mean_motion: self.line2_field(52..63, "mean motion")?,
        })
    }

    fn line2_field(&self, range: std::ops::Range<usize>, field: &str) -> Result<f64, SatTrackError> {
        self.line2
            .get(range)
            .and_then(|text| text.trim().parse::<f64>().ok())
            .ok_or_else(|| {
                SatTrackError::InvalidElementSet(format!(
                    "object {}: cannot read {field} from line 2",
                    self.object_id
                ))
            })
    }

    fn eccentricity(&self) -> Result<f64, SatTrackError> {
        self.line2
            .get(26..33)
            .and_then(|digits| format!("0.{}", digits.trim()).parse::<f64>().ok())
            .ok_or_else(|| {
                SatTrackError::InvalidElementSet(format!(
                    "object {}: cannot read eccentricity from line 2",
                    self.object_id
                ))
            })
    }
}

/// Source of element sets for the tracked objects.
#[allow(async_fn_in_trait)]
pub trait ElementSetProvider {
    /// Provider name recorded in the integrity status.
    fn name(&self) -> &str;

    /// Latest element sets of the requested objects.
    ///
    /// Objects the provider knows nothing about are simply absent from the result.
    async fn fetch_element_sets(
        &self,
        object_ids: &[ObjectId],
    ) -> Result<Vec<ElementSet>, SatTrackError>;
}

/// Source of current space-weather indices.
#[allow(async_fn_in_trait)]
pub trait SpaceWeatherProvider {
    fn name(&self) -> &str;

    async fn fetch_current(&self) -> Result<SpaceWeatherReport, SatTrackError>;
}

/// An independently determined position of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePosition {
    pub geodetic: GeodeticPosition,
    pub timestamp: Epoch,
    /// Origin of the measurement (e.g. laser ranging station)
    pub source: String,
}

/// Source of precise reference positions, used by validation only.
pub trait ReferenceEphemerisProvider {
    fn name(&self) -> &str;

    /// Most recent reference position of `object_id`, if any.
    fn reference_position(&self, object_id: &str) -> Option<ReferencePosition>;
}

/// Conversion of an element set into an initial Cartesian state.
pub trait InitialStateSource {
    fn initial_state(&self, element_set: &ElementSet) -> Result<OrbitState, SatTrackError>;
}

/// Fixed element sets keyed by object id.
#[derive(Debug, Clone, Default)]
pub struct StaticElementSets {
    element_sets: HashMap<ObjectId, ElementSet>,
}

impl StaticElementSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the element set of `element_set.object_id`.
    pub fn insert(&mut self, element_set: ElementSet) {
        self.element_sets
            .insert(element_set.object_id.clone(), element_set);
    }
}

impl FromIterator<ElementSet> for StaticElementSets {
    fn from_iter<T: IntoIterator<Item = ElementSet>>(iter: T) -> Self {
        let mut sets = StaticElementSets::new();
        for element_set in iter {
            sets.insert(element_set);
        }
        sets
    }
}

impl ElementSetProvider for StaticElementSets {
    fn name(&self) -> &str {
        "static element sets"
    }

    async fn fetch_element_sets(
        &self,
        object_ids: &[ObjectId],
    ) -> Result<Vec<ElementSet>, SatTrackError> {
        Ok(object_ids
            .iter()
            .filter_map(|id| self.element_sets.get(id).cloned())
            .collect())
    }
}

/// A fixed space-weather report, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticSpaceWeather {
    report: Option<SpaceWeatherReport>,
}

impl StaticSpaceWeather {
    pub fn new(report: SpaceWeatherReport) -> Self {
        Self {
            report: Some(report),
        }
    }

    /// A provider that never has data.
    pub fn unavailable() -> Self {
        Self { report: None }
    }
}

impl SpaceWeatherProvider for StaticSpaceWeather {
    fn name(&self) -> &str {
        "static space weather"
    }

    async fn fetch_current(&self) -> Result<SpaceWeatherReport, SatTrackError> {
        self.report
            .ok_or_else(|| SatTrackError::unavailable(self.name(), "no report configured"))
    }
}

/// In-memory reference positions keyed by object id.
#[derive(Debug, Clone, Default)]
pub struct StaticEphemerides {
    positions: HashMap<ObjectId, Vec<ReferencePosition>>,
}

impl StaticEphemerides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object_id: impl Into<ObjectId>, position: ReferencePosition) {
        self.positions
            .entry(object_id.into())
            .or_default()
            .push(position);
    }
}

impl ReferenceEphemerisProvider for StaticEphemerides {
    fn name(&self) -> &str {
        "static ephemerides"
    }

    fn reference_position(&self, object_id: &str) -> Option<ReferencePosition> {
        self.positions
            .get(object_id)?
            .iter()
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
            .cloned()
    }
}

#[cfg(test)]
mod providers_test {
    use super::*;
    use approx::assert_relative_eq;

    const ISS_LINE1: &str =
        "1 25544U 98067A   25072.43808874  .00018974  00000+0  33994-3 0  9997";
    const ISS_LINE2: &str =
        "2 25544  51.6354  61.2721 0006420  16.6184 343.5014 15.49959635500318";

    fn iss() -> ElementSet {
        ElementSet::new(
            "25544",
            "ISS (ZARYA)",
            ISS_LINE1,
            ISS_LINE2,
            Epoch::from_gregorian_utc_hms(2025, 3, 13, 10, 30, 50),
        )
    }

    #[test]
    fn test_mean_elements() {
        let elements = iss().mean_elements().unwrap();
        assert_relative_eq!(elements.inclination, 51.6354);
        assert_relative_eq!(elements.raan, 61.2721);
        assert_relative_eq!(elements.eccentricity, 0.000642);
        assert_relative_eq!(elements.arg_of_perigee, 16.6184);
        assert_relative_eq!(elements.mean_anomaly, 343.5014);
        assert_relative_eq!(elements.mean_motion, 15.49959635);
    }

    #[test]
    fn test_mean_elements_truncated_line() {
        let mut set = iss();
        set.line2 = "2 25544  51.6354  61.2721".to_string();
        assert_eq!(
            set.mean_elements(),
            Err(SatTrackError::InvalidElementSet(
                "object 25544: cannot read eccentricity from line 2".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_static_element_sets_skip_unknown() {
        let provider: StaticElementSets = [iss()].into_iter().collect();
        let sets = provider
            .fetch_element_sets(&["25544".to_string(), "99999".to_string()])
            .await
            .unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "ISS (ZARYA)");
    }

    #[tokio::test]
    async fn test_static_space_weather_unavailable() {
        let provider = StaticSpaceWeather::unavailable();
        assert!(matches!(
            provider.fetch_current().await,
            Err(SatTrackError::ProviderUnavailable { .. })
        ));
    }

    #[test]
    fn test_static_ephemerides_latest() {
        let epoch = Epoch::from_gregorian_utc_hms(2024, 1, 15, 11, 0, 0);
        let mut ephemerides = StaticEphemerides::new();
        assert!(ephemerides.reference_position("25544").is_none());

        for (hour, lat) in [(2.0, 20.0), (1.0, 10.0)] {
            ephemerides.insert(
                "25544",
                ReferencePosition {
                    geodetic: GeodeticPosition::new(lat, 0.0, 400.0),
                    timestamp: epoch + hour * hifitime::Unit::Hour,
                    source: "SLR".to_string(),
                },
            );
        }

        let latest = ephemerides.reference_position("25544").unwrap();
        assert_eq!(latest.geodetic.latitude, 20.0);
    }
}
