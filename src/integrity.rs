//! # Data integrity status
//!
//! Tracks, per external data source, whether the last attempt produced real data or nothing.
//! The tracker owns one [`DataIntegrity`] and lends it to the validator; there is no
//! process-wide instance.

use std::collections::BTreeMap;
use std::fmt;

use hifitime::Epoch;
use log::{info, warn};

/// External data sources feeding the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataSource {
    ElementSets,
    SpaceWeather,
    ReferenceEphemeris,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataSource::ElementSets => "TLE_DATA",
            DataSource::SpaceWeather => "SPACE_WEATHER",
            DataSource::ReferenceEphemeris => "REFERENCE_EPHEMERIS",
        };
        write!(f, "{label}")
    }
}

/// Last known status of a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct DataStatus {
    pub is_real: bool,
    /// Provider name, or `UNAVAILABLE: <reason>`
    pub source: String,
    pub last_checked: Epoch,
}

#[derive(Debug, Clone, Default)]
pub struct DataIntegrity {
    statuses: BTreeMap<DataSource, DataStatus>,
}

impl DataIntegrity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_real(&mut self, data: DataSource, provider: &str, at: Epoch) {
        info!("REAL DATA: {data} from {provider}");
        self.statuses.insert(
            data,
            DataStatus {
                is_real: true,
                source: provider.to_string(),
                last_checked: at,
            },
        );
    }

    pub fn mark_unavailable(&mut self, data: DataSource, reason: &str, at: Epoch) {
        warn!("NO DATA: {data} - {reason}");
        self.statuses.insert(
            data,
            DataStatus {
                is_real: false,
                source: format!("UNAVAILABLE: {reason}"),
                last_checked: at,
            },
        );
    }

    /// `false` for a source never checked.
    pub fn is_real(&self, data: DataSource) -> bool {
        self.statuses.get(&data).is_some_and(|s| s.is_real)
    }

    pub fn status(&self, data: DataSource) -> Option<&DataStatus> {
        self.statuses.get(&data)
    }

    pub fn snapshot(&self) -> impl Iterator<Item = (&DataSource, &DataStatus)> {
        self.statuses.iter()
    }

    /// Log one line per known source.
    pub fn report(&self) {
        info!("DATA INTEGRITY CHECK:");
        for (data, status) in &self.statuses {
            let mark = if status.is_real { "OK" } else { "MISSING" };
            info!("  [{mark}] {data}: {}", status.source);
        }
    }
}

#[cfg(test)]
mod integrity_test {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let at = Epoch::from_gregorian_utc_hms(2024, 1, 15, 11, 0, 0);
        let mut integrity = DataIntegrity::new();

        assert!(!integrity.is_real(DataSource::SpaceWeather));
        assert!(integrity.status(DataSource::SpaceWeather).is_none());

        integrity.mark_real(DataSource::SpaceWeather, "NOAA", at);
        assert!(integrity.is_real(DataSource::SpaceWeather));
        assert_eq!(integrity.status(DataSource::SpaceWeather).unwrap().source, "NOAA");

        integrity.mark_unavailable(DataSource::SpaceWeather, "NOAA API failed", at);
        let status = integrity.status(DataSource::SpaceWeather).unwrap();
        assert!(!status.is_real);
        assert_eq!(status.source, "UNAVAILABLE: NOAA API failed");
        assert_eq!(status.last_checked, at);

        integrity.mark_real(DataSource::ElementSets, "static", at);
        assert_eq!(integrity.snapshot().count(), 2);
        integrity.report();
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(DataSource::ElementSets.to_string(), "TLE_DATA");
        assert_eq!(DataSource::SpaceWeather.to_string(), "SPACE_WEATHER");
    }
}
