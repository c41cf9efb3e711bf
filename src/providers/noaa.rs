//! # NOAA SWPC space-weather client
//!
//! Fetches the current planetary Kp index and the F10.7 solar flux from the NOAA Space
//! Weather Prediction Center JSON products. Ap is derived from Kp with
//! [`kp_to_ap`](crate::space_weather::kp_to_ap); Dst is not published by these products and is
//! reported as `None`.
//!
//! Both products are tables encoded as arrays of rows, the first row being the header. The
//! most recent value is read from the last row:
//!
//! | product            | column |
//! |--------------------|--------|
//! | planetary K index  | 1      |
//! | F10.7              | 6      |
//!
//! Any failure (HTTP, decoding, missing cell) is returned as an error; no default index is
//! ever substituted.

use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::SpaceWeatherProvider;
use crate::sattrack_errors::SatTrackError;
use crate::space_weather::{kp_to_ap, SpaceWeatherReport};

pub const PLANETARY_K_INDEX_URL: &str =
    "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";
pub const SOLAR_FLUX_URL: &str = "https://services.swpc.noaa.gov/products/solar-wind/f107.json";

const PROVIDER_NAME: &str = "NOAA";
const KP_COLUMN: usize = 1;
const F107_COLUMN: usize = 6;

/// One cell of a SWPC table: numbers are usually sent as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Number(f64),
    Text(String),
    Null,
}

impl TableCell {
    fn as_f64(&self) -> Option<f64> {
        match self {
            TableCell::Number(value) => Some(*value),
            TableCell::Text(text) => text.trim().parse().ok(),
            TableCell::Null => None,
        }
    }
}

pub type SwpcTable = Vec<Vec<TableCell>>;

/// Client of the SWPC JSON products.
#[derive(Debug, Clone)]
pub struct NoaaSpaceWeather {
    client: Client,
    kp_url: String,
    flux_url: String,
}

impl Default for NoaaSpaceWeather {
    fn default() -> Self {
        Self::new()
    }
}

impl NoaaSpaceWeather {
    pub fn new() -> Self {
        Self::with_urls(PLANETARY_K_INDEX_URL, SOLAR_FLUX_URL)
    }

    /// Client reading the two products from other locations (mirror, local server).
    pub fn with_urls(kp_url: impl Into<String>, flux_url: impl Into<String>) -> Self {
        NoaaSpaceWeather {
            client: Client::new(),
            kp_url: kp_url.into(),
            flux_url: flux_url.into(),
        }
    }

    async fn fetch_table(&self, url: &str) -> Result<SwpcTable, SatTrackError> {
        debug!("fetching {url}");
        let table = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<SwpcTable>()
            .await?;
        Ok(table)
    }
}

/// Value of `column` in the last row of a SWPC table.
///
/// Return
/// ----------
/// * The parsed value, or [`SatTrackError::ProviderUnavailable`] when the table has no data
///   row or the cell is missing or not numeric.
pub fn latest_value(table: &SwpcTable, column: usize, product: &str) -> Result<f64, SatTrackError> {
    // Row 0 is the header
    if table.len() < 2 {
        return Err(SatTrackError::unavailable(
            PROVIDER_NAME,
            format!("{product}: no data row"),
        ));
    }

    table
        .last()
        .and_then(|row| row.get(column))
        .and_then(TableCell::as_f64)
        .ok_or_else(|| {
            SatTrackError::unavailable(
                PROVIDER_NAME,
                format!("{product}: no numeric value in column {column} of the latest row"),
            )
        })
}

/// Build a report from the two SWPC tables.
pub fn report_from_tables(
    kp_table: &SwpcTable,
    flux_table: &SwpcTable,
) -> Result<SpaceWeatherReport, SatTrackError> {
    let kp_index = latest_value(kp_table, KP_COLUMN, "planetary K index")?;
    let solar_flux = latest_value(flux_table, F107_COLUMN, "F10.7")?;

    Ok(SpaceWeatherReport {
        solar_flux,
        kp_index,
        ap_index: kp_to_ap(kp_index),
        dst_index: None,
    })
}

impl SpaceWeatherProvider for NoaaSpaceWeather {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_current(&self) -> Result<SpaceWeatherReport, SatTrackError> {
        let kp_table = self.fetch_table(&self.kp_url).await?;
        let flux_table = self.fetch_table(&self.flux_url).await?;
        report_from_tables(&kp_table, &flux_table)
    }
}

#[cfg(test)]
mod noaa_test {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<TableCell> {
        cells.iter().map(|c| TableCell::Text(c.to_string())).collect()
    }

    fn kp_table() -> SwpcTable {
        vec![
            text_row(&["time_tag", "Kp", "a_running", "station_count"]),
            text_row(&["2024-01-15 06:00:00.000", "1.67", "6", "8"]),
            text_row(&["2024-01-15 09:00:00.000", "2.33", "9", "8"]),
        ]
    }

    fn flux_table() -> SwpcTable {
        vec![
            text_row(&["time_tag", "a", "b", "c", "d", "e", "flux"]),
            vec![
                TableCell::Text("2024-01-15".to_string()),
                TableCell::Null,
                TableCell::Null,
                TableCell::Null,
                TableCell::Null,
                TableCell::Null,
                TableCell::Number(162.4),
            ],
        ]
    }

    #[test]
    fn test_report_from_tables() {
        let report = report_from_tables(&kp_table(), &flux_table()).unwrap();
        assert_eq!(report.kp_index, 2.33);
        assert_eq!(report.ap_index, 9.0);
        assert_eq!(report.solar_flux, 162.4);
        assert_eq!(report.dst_index, None);
    }

    #[test]
    fn test_header_only_table() {
        let header_only = vec![text_row(&["time_tag", "Kp"])];
        assert!(matches!(
            latest_value(&header_only, KP_COLUMN, "planetary K index"),
            Err(SatTrackError::ProviderUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_flux_is_an_error() {
        let short_row = vec![
            text_row(&["time_tag", "flux"]),
            text_row(&["2024-01-15", "150"]),
        ];
        assert!(report_from_tables(&kp_table(), &short_row).is_err());
    }
}
