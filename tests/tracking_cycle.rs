mod common;

use approx::assert_relative_eq;
use sattrack::integrity::DataSource;
use sattrack::propagator::{cartesian_to_geodetic, EnhancedPropagator};
use sattrack::providers::sgp4_source::Sgp4StateSource;
use sattrack::providers::{InitialStateSource, StaticSpaceWeather};
use sattrack::state::{EnvironmentalData, SatelliteParameters};
use sattrack::storage::TrackingStore;
use sattrack::tracking::tracker::{PositionReport, UnavailableReason};

use crate::common::{after, delfi, element_sets, iss, quiet_weather, tracker_for};

#[tokio::test]
async fn test_two_cycles_smooth_propagated_states() {
    let iss = iss();
    let mut tracker = tracker_for(&["25544", "51074", "43013"]);
    let provider = element_sets(&[iss.clone(), delfi()]);

    let first = tracker
        .update_cycle(iss.epoch, &provider, &quiet_weather())
        .await;
    assert_eq!(first.processed, vec!["25544".to_string(), "51074".to_string()]);
    assert_eq!(first.missing, vec!["43013".to_string()]);
    assert_eq!(tracker.filters().len(), 2);

    // Element-set age is zero for the ISS: 2500 * 0.3 * 0.7, parameters unknown
    let seeded = tracker.store().get_latest_position("25544").unwrap();
    assert_relative_eq!(seeded.accuracy_estimate, 525.0, max_relative = 1e-12);
    assert!(seeded.geodetic.altitude > 300.0 && seeded.geodetic.altitude < 500.0);

    let at = after(iss.epoch, 60.0);
    let second = tracker.update_cycle(at, &provider, &quiet_weather()).await;
    assert_eq!(second.processed.len(), 2);
    assert_eq!(tracker.store().get_position_history("25544", 10).len(), 2);

    // Predict copies the propagated state and the update sees a zero innovation, so the stored
    // position is the propagated one
    let initial = Sgp4StateSource::new().initial_state(&iss).unwrap();
    let env = EnvironmentalData::new(150.0, 2.0, 7.0);
    let propagated = EnhancedPropagator::new().propagate(
        &initial,
        at,
        &SatelliteParameters::default(),
        Some(&env),
    );
    let expected = cartesian_to_geodetic(&propagated.position);
    let stored = tracker.store().get_latest_position("25544").unwrap();
    assert_relative_eq!(stored.geodetic.latitude, expected.latitude, max_relative = 1e-12);
    assert_relative_eq!(stored.geodetic.longitude, expected.longitude, max_relative = 1e-12);
    assert_relative_eq!(stored.geodetic.altitude, expected.altitude, max_relative = 1e-12);
    assert_eq!(stored.timestamp, at);

    // One prediction of 60 s then one update with R = 1000
    let inflated: f64 = 1e6 + 1e-6 * 60.0;
    let expected_uncertainty = (3.0 * inflated * 1000.0 / (inflated + 1000.0)).sqrt();
    assert_relative_eq!(
        tracker.filters().get("25544").unwrap().uncertainty(),
        expected_uncertainty,
        max_relative = 1e-9
    );

    let expected_accuracy = 525.0 * (1.0 + (60.0 / 3600.0) / 12.0 * 0.05);
    assert_relative_eq!(
        stored.accuracy_estimate,
        expected_accuracy,
        max_relative = 1e-12
    );
}

#[tokio::test]
async fn test_cycle_degrades_without_space_weather() {
    let iss = iss();
    let mut tracker = tracker_for(&["25544"]);

    let report = tracker
        .update_cycle(
            after(iss.epoch, 120.0),
            &element_sets(&[iss.clone()]),
            &StaticSpaceWeather::unavailable(),
        )
        .await;

    assert!(report.environment.is_none());
    assert_eq!(report.processed.len(), 1);

    let integrity = tracker.integrity();
    assert!(integrity.is_real(DataSource::ElementSets));
    assert!(!integrity.is_real(DataSource::SpaceWeather));
    assert!(integrity
        .status(DataSource::SpaceWeather)
        .unwrap()
        .source
        .starts_with("UNAVAILABLE: "));

    // No space-weather credit: 2500 * 0.3 * (1 + (120 s / 12 h) * 0.05)
    let position = tracker.store().get_latest_position("25544").unwrap();
    assert_relative_eq!(
        position.accuracy_estimate,
        750.0 * (1.0 + (120.0 / 3600.0) / 12.0 * 0.05),
        max_relative = 1e-12
    );
    assert!(tracker.store().get_latest_space_weather().is_none());
}

#[tokio::test]
async fn test_position_report() {
    let iss = iss();
    let mut tracker = tracker_for(&["25544"]);
    assert_eq!(
        tracker.satellite_position("25544"),
        PositionReport::Unavailable(UnavailableReason::UnknownSatellite)
    );

    tracker
        .update_cycle(iss.epoch, &element_sets(&[iss.clone()]), &quiet_weather())
        .await;

    match tracker.satellite_position("25544") {
        PositionReport::Position(position) => {
            assert_eq!(position.name, "ISS (ZARYA)");
            assert_eq!(position.object_id, "25544");
            assert_eq!(position.confidence, 95.0);
            assert_eq!(position.method, "enhanced+kalman");
            assert_eq!(position.timestamp, iss.epoch);
            assert!(position.accuracy_m >= 150.0);
        }
        other => panic!("expected a position, got {other:?}"),
    }

    let stats = tracker.store().system_stats();
    assert_eq!(stats.total_satellites, 1);
    assert_eq!(stats.validated_satellites, 0);
    assert_eq!(stats.avg_accuracy, None);
}
