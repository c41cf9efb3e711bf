#![allow(dead_code)]

use hifitime::Epoch;
use sattrack::providers::sgp4_source::element_set_from_tle;
use sattrack::providers::{ElementSet, StaticElementSets, StaticSpaceWeather};
use sattrack::space_weather::{kp_to_ap, SpaceWeatherReport};
use sattrack::storage::MemStorage;
use sattrack::tracking::tracker::SatelliteTracker;
use sattrack::tracking::TrackerParams;

pub const ISS_NAME: &str = "ISS (ZARYA)";
pub const ISS_LINE1: &str = "1 25544U 98067A   25072.43808874  .00018974  00000+0  33994-3 0  9997";
pub const ISS_LINE2: &str = "2 25544  51.6354  61.2721 0006420  16.6184 343.5014 15.49959635500318";

pub const DELFI_NAME: &str = "DELFI-PQ";
pub const DELFI_LINE1: &str = "1 51074U 22002CU  23120.77859283  .00033391  00000+0  10673-2 0  9997";
pub const DELFI_LINE2: &str = "2 51074  97.4622 192.5713 0010271  72.5102 287.7261 15.32323264 71737";

pub fn iss() -> ElementSet {
    element_set_from_tle(ISS_NAME, ISS_LINE1, ISS_LINE2).unwrap()
}

pub fn delfi() -> ElementSet {
    element_set_from_tle(DELFI_NAME, DELFI_LINE1, DELFI_LINE2).unwrap()
}

pub fn element_sets(sets: &[ElementSet]) -> StaticElementSets {
    sets.iter().cloned().collect()
}

pub fn quiet_weather() -> StaticSpaceWeather {
    StaticSpaceWeather::new(SpaceWeatherReport {
        solar_flux: 150.0,
        kp_index: 2.0,
        ap_index: kp_to_ap(2.0),
        dst_index: None,
    })
}

pub fn tracker_for(ids: &[&str]) -> SatelliteTracker<MemStorage> {
    let params = TrackerParams::builder()
        .tracked_objects(ids.iter().map(|id| id.to_string()).collect())
        .build()
        .unwrap();
    SatelliteTracker::new(params, MemStorage::new())
}

/// Instant `seconds` after `epoch`.
pub fn after(epoch: Epoch, seconds: f64) -> Epoch {
    epoch + seconds * hifitime::Unit::Second
}
