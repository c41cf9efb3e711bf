//! # Space-weather indices
//!
//! Conversion of the planetary Kp index to the linear Ap scale, geomagnetic storm
//! classification, and the [`SpaceWeatherReport`] returned by providers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::EnvironmentalData;

/// Ap value used when a Kp value is not one of the standard thirds.
pub const DEFAULT_AP: f64 = 27.0;

/// Kp thirds (×3, i.e. 0, 0.33, 0.67, 1, …) → Ap.
const KP_THIRDS_TO_AP: [f64; 28] = [
    0.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 9.0, 12.0, 15.0, 18.0, 22.0, 27.0, 32.0, 39.0, 48.0, 56.0,
    67.0, 80.0, 94.0, 111.0, 132.0, 154.0, 179.0, 207.0, 236.0, 300.0, 400.0,
];

/// Indices reported by a space-weather provider for the current time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceWeatherReport {
    /// F10.7 solar radio flux (sfu)
    pub solar_flux: f64,
    pub kp_index: f64,
    pub ap_index: f64,
    /// Disturbance storm time index (nT), when the provider has it
    pub dst_index: Option<f64>,
}

impl SpaceWeatherReport {
    pub fn environmental_data(&self) -> EnvironmentalData {
        EnvironmentalData::new(self.solar_flux, self.kp_index, self.ap_index)
    }
}

/// Approximate Ap equivalent of a Kp value.
///
/// Kp is matched on two decimals against the standard thirds table (`0, 0.33, 0.67, …, 9`).
/// Any other value (including non-finite ones) maps to [`DEFAULT_AP`].
pub fn kp_to_ap(kp: f64) -> f64 {
    let rounded = format!("{kp:.2}");
    KP_THIRDS_TO_AP
        .iter()
        .enumerate()
        .find(|(thirds, _)| kp_third_label(*thirds) == rounded)
        .map(|(_, ap)| *ap)
        .unwrap_or(DEFAULT_AP)
}

fn kp_third_label(thirds: usize) -> String {
    let whole = thirds / 3;
    match thirds % 3 {
        0 => format!("{whole}.00"),
        1 => format!("{whole}.33"),
        _ => format!("{whole}.67"),
    }
}

/// Geomagnetic activity level derived from Kp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeomagneticActivity {
    Quiet,
    Unsettled,
    Active,
    MinorStorm,
    ModerateStorm,
    StrongStorm,
    SevereStorm,
}

impl GeomagneticActivity {
    pub fn from_kp(kp: f64) -> Self {
        match kp {
            k if k < 1.0 => GeomagneticActivity::Quiet,
            k if k < 2.0 => GeomagneticActivity::Unsettled,
            k if k < 3.0 => GeomagneticActivity::Active,
            k if k < 4.0 => GeomagneticActivity::MinorStorm,
            k if k < 5.0 => GeomagneticActivity::ModerateStorm,
            k if k < 6.0 => GeomagneticActivity::StrongStorm,
            _ => GeomagneticActivity::SevereStorm,
        }
    }

    pub fn is_storm(&self) -> bool {
        matches!(
            self,
            GeomagneticActivity::MinorStorm
                | GeomagneticActivity::ModerateStorm
                | GeomagneticActivity::StrongStorm
                | GeomagneticActivity::SevereStorm
        )
    }
}

impl fmt::Display for GeomagneticActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GeomagneticActivity::Quiet => "Quiet",
            GeomagneticActivity::Unsettled => "Unsettled",
            GeomagneticActivity::Active => "Active",
            GeomagneticActivity::MinorStorm => "Minor Storm",
            GeomagneticActivity::ModerateStorm => "Moderate Storm",
            GeomagneticActivity::StrongStorm => "Strong Storm",
            GeomagneticActivity::SevereStorm => "Severe Storm",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod space_weather_test {
    use super::*;

    #[test]
    fn test_kp_to_ap_table() {
        assert_eq!(kp_to_ap(0.0), 0.0);
        assert_eq!(kp_to_ap(0.33), 2.0);
        assert_eq!(kp_to_ap(2.0), 7.0);
        assert_eq!(kp_to_ap(3.0), 15.0);
        assert_eq!(kp_to_ap(4.67), 39.0);
        assert_eq!(kp_to_ap(8.67), 300.0);
        assert_eq!(kp_to_ap(9.0), 400.0);
        // 1/3 steps written with full precision round to the table labels
        assert_eq!(kp_to_ap(7.0 / 3.0), 9.0);
    }

    #[test]
    fn test_kp_to_ap_unknown_value() {
        assert_eq!(kp_to_ap(2.5), DEFAULT_AP);
        assert_eq!(kp_to_ap(-1.0), DEFAULT_AP);
        assert_eq!(kp_to_ap(f64::NAN), DEFAULT_AP);
    }

    #[test]
    fn test_activity_levels() {
        assert_eq!(GeomagneticActivity::from_kp(0.67), GeomagneticActivity::Quiet);
        assert_eq!(GeomagneticActivity::from_kp(1.0), GeomagneticActivity::Unsettled);
        assert_eq!(GeomagneticActivity::from_kp(2.33), GeomagneticActivity::Active);
        assert_eq!(GeomagneticActivity::from_kp(3.67), GeomagneticActivity::MinorStorm);
        assert_eq!(GeomagneticActivity::from_kp(4.0), GeomagneticActivity::ModerateStorm);
        assert_eq!(GeomagneticActivity::from_kp(5.33), GeomagneticActivity::StrongStorm);
        assert_eq!(GeomagneticActivity::from_kp(8.0), GeomagneticActivity::SevereStorm);

        assert!(!GeomagneticActivity::Active.is_storm());
        assert!(GeomagneticActivity::MinorStorm.is_storm());
        assert_eq!(GeomagneticActivity::StrongStorm.to_string(), "Strong Storm");
    }

    #[test]
    fn test_report_drops_dst() {
        let report = SpaceWeatherReport {
            solar_flux: 140.0,
            kp_index: 2.0,
            ap_index: 7.0,
            dst_index: Some(-20.0),
        };
        assert_eq!(
            report.environmental_data(),
            EnvironmentalData::new(140.0, 2.0, 7.0)
        );
    }
}
