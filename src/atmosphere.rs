//! # Atmospheric density model
//!
//! Density estimate feeding the drag term of the [`propagator`](crate::propagator).
//!
//! The only model shipped is [`PiecewiseExponential`], a banded exponential profile scaled by
//! the current solar flux and geomagnetic activity. It is a reduced-fidelity
//! stand-in for a full empirical thermosphere model.
//!
//! ## Profile
//!
//! | band (km)   | reference (km) | ρ at reference (kg/m³) | scale height (km) |
//! |-------------|----------------|------------------------|-------------------|
//! | `[0, 200)`  | 175            | 2.5e-11                | 50                |
//! | `[200, 300)`| 200            | 1.2e-11                | 60                |
//! | `[300, 500)`| 300            | 8.0e-12                | 75                |
//! | `[500, ∞)`  | 500            | 3.0e-12                | 100               |
//!
//! Corrections applied on top of the baseline:
//!
//! ```text
//! f_solar = 1 + 0.3 (F10.7 - 150) / 100
//! f_geo   = 1 + 0.2 Ap / 50
//! ρ       = max(ρ_base · f_solar · f_geo, 1e-15)
//! ```
//!
//! The result is never zero, negative or non-finite, so callers can divide by it safely.

use crate::constants::{Meter, METERS_PER_KM, MIN_ATMOSPHERIC_DENSITY};
use crate::state::EnvironmentalData;

/// Trait for atmospheric density models.
///
/// Implementations must be thread-safe (`Send + Sync`) so a propagator can be shared.
pub trait AtmosphereModel: Send + Sync {
    /// Density in kg/m³ at the given geocentric altitude (meters).
    fn density(&self, altitude: Meter, env: &EnvironmentalData) -> f64;

    /// Model name for logging and display
    fn name(&self) -> &'static str;
}

/// One altitude band of the exponential profile.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DensityBand {
    /// Upper bound of the band in km (exclusive)
    upper_km: f64,
    reference_km: f64,
    reference_density: f64,
    scale_height_km: f64,
}

const BANDS: [DensityBand; 4] = [
    DensityBand {
        upper_km: 200.0,
        reference_km: 175.0,
        reference_density: 2.5e-11,
        scale_height_km: 50.0,
    },
    DensityBand {
        upper_km: 300.0,
        reference_km: 200.0,
        reference_density: 1.2e-11,
        scale_height_km: 60.0,
    },
    DensityBand {
        upper_km: 500.0,
        reference_km: 300.0,
        reference_density: 8.0e-12,
        scale_height_km: 75.0,
    },
    DensityBand {
        upper_km: f64::INFINITY,
        reference_km: 500.0,
        reference_density: 3.0e-12,
        scale_height_km: 100.0,
    },
];

/// Banded exponential atmosphere with space-weather corrections.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PiecewiseExponential;

impl PiecewiseExponential {
    pub fn new() -> Self {
        PiecewiseExponential
    }

    /// Baseline density (kg/m³) before space-weather corrections.
    ///
    /// Arguments
    /// -----------------
    /// * `altitude_km`: geocentric altitude in kilometers.
    ///
    /// Return
    /// ----------
    /// * The exponential profile value of the band containing `altitude_km`.
    pub fn baseline_density(altitude_km: f64) -> f64 {
        let band = BANDS
            .iter()
            .find(|band| altitude_km < band.upper_km)
            .unwrap_or(&BANDS[BANDS.len() - 1]);

        band.reference_density * (-(altitude_km - band.reference_km) / band.scale_height_km).exp()
    }

    /// Multiplicative solar-activity correction `1 + 0.3 (F10.7 - 150) / 100`.
    pub fn solar_flux_factor(solar_flux: f64) -> f64 {
        1.0 + 0.3 * (solar_flux - 150.0) / 100.0
    }

    /// Multiplicative geomagnetic correction `1 + 0.2 Ap / 50`.
    pub fn geomagnetic_factor(ap_index: f64) -> f64 {
        1.0 + 0.2 * ap_index / 50.0
    }
}

impl AtmosphereModel for PiecewiseExponential {
    fn density(&self, altitude: Meter, env: &EnvironmentalData) -> f64 {
        let rho = Self::baseline_density(altitude / METERS_PER_KM)
            * Self::solar_flux_factor(env.solar_flux)
            * Self::geomagnetic_factor(env.ap_index);

        if !rho.is_finite() {
            return MIN_ATMOSPHERIC_DENSITY;
        }
        rho.max(MIN_ATMOSPHERIC_DENSITY)
    }

    fn name(&self) -> &'static str {
        "Piecewise exponential"
    }
}
