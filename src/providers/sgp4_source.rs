//! # SGP4 initial state
//!
//! Converts an [`ElementSet`] into the Cartesian [`OrbitState`] the propagator starts from,
//! using the `sgp4` crate. The state is evaluated at the element-set epoch (zero minutes since
//! epoch) and stamped with that epoch, so the propagator covers the whole span up to the
//! target time.
//!
//! `sgp4` works in kilometers and km/s; the returned state is in meters and m/s.

use hifitime::Epoch;
use sgp4::{Constants, Elements};

use super::{ElementSet, InitialStateSource};
use crate::sattrack_errors::SatTrackError;
use crate::state::OrbitState;

/// [`InitialStateSource`] backed by SGP4.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4StateSource;

impl Sgp4StateSource {
    pub fn new() -> Self {
        Sgp4StateSource
    }
}

impl InitialStateSource for Sgp4StateSource {
    fn initial_state(&self, element_set: &ElementSet) -> Result<OrbitState, SatTrackError> {
        let elements = parse_elements(Some(element_set.name.clone()), &element_set.line1, &element_set.line2)?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| SatTrackError::Sgp4Error(format!("{}: {e:?}", element_set.object_id)))?;
        let prediction = constants
            .propagate(0.0)
            .map_err(|e| SatTrackError::Sgp4Error(format!("{}: {e:?}", element_set.object_id)))?;

        Ok(OrbitState::from_km(
            prediction.position,
            prediction.velocity,
            element_set.epoch,
        ))
    }
}

/// Build an [`ElementSet`] from raw two-line text.
///
/// The object id is the catalog number of line 1 and the epoch is decoded from line 1.
///
/// Arguments
/// -----------------
/// * `name`: object name (title line of a three-line set).
/// * `line1`, `line2`: the two element lines.
///
/// Return
/// ----------
/// * The element set, or [`SatTrackError::InvalidElementSet`] when the text does not parse.
pub fn element_set_from_tle(name: &str, line1: &str, line2: &str) -> Result<ElementSet, SatTrackError> {
    let (line1, line2) = (line1.trim(), line2.trim());
    let elements = parse_elements(Some(name.trim().to_string()), line1, line2)?;

    let datetime = elements.datetime.and_utc();
    let epoch = Epoch::from_unix_seconds(
        datetime.timestamp() as f64 + f64::from(datetime.timestamp_subsec_nanos()) * 1e-9,
    );

    Ok(ElementSet::new(
        elements.norad_id.to_string(),
        name.trim(),
        line1,
        line2,
        epoch,
    ))
}

fn parse_elements(name: Option<String>, line1: &str, line2: &str) -> Result<Elements, SatTrackError> {
    Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
        .map_err(|e| SatTrackError::InvalidElementSet(format!("{e:?}")))
}

#[cfg(test)]
mod sgp4_source_test {
    use super::*;
    use hifitime::Unit;

    const ISS_LINE1: &str = "1 25544U 98067A   25072.43808874  .00018974  00000+0  33994-3 0  9997";
    const ISS_LINE2: &str = "2 25544  51.6354  61.2721 0006420  16.6184 343.5014 15.49959635500318";

    #[test]
    fn test_element_set_from_tle() {
        let set = element_set_from_tle("ISS (ZARYA)   ", ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(set.object_id, "25544");
        assert_eq!(set.name, "ISS (ZARYA)");

        // Day 72.43808874 of 2025
        let expected = Epoch::from_gregorian_utc_hms(2025, 3, 13, 10, 30, 50);
        assert!((set.epoch - expected).abs() < 1.0 * Unit::Second);
    }

    #[test]
    fn test_initial_state_low_earth_orbit() {
        let set = element_set_from_tle("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).unwrap();
        let state = Sgp4StateSource::new().initial_state(&set).unwrap();

        assert_eq!(state.timestamp, set.epoch);
        assert!(state.is_finite());
        // ~400 km altitude, ~7.66 km/s
        assert!(state.altitude() > 300_000.0 && state.altitude() < 500_000.0);
        assert!(state.speed() > 7_500.0 && state.speed() < 7_800.0);
    }

    #[test]
    fn test_invalid_lines() {
        let err = element_set_from_tle("BROKEN", "1 not an element set", ISS_LINE2);
        match err {
            Err(SatTrackError::InvalidElementSet(message)) => assert!(!message.is_empty()),
            other => panic!("expected an invalid element set, got {other:?}"),
        }

        let set = ElementSet::new(
            "25544",
            "BROKEN",
            "garbage",
            ISS_LINE2,
            Epoch::from_gregorian_utc_hms(2025, 3, 13, 10, 30, 50),
        );
        assert!(Sgp4StateSource::new().initial_state(&set).is_err());
    }
}
