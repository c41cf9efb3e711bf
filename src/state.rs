//! # Orbital state and propagation inputs
//!
//! Value types exchanged between the propagator, the per-object filter and the tracker:
//!
//! - [`OrbitState`] – Cartesian position (m) and velocity (m/s) in an Earth-centered
//!   inertial-like frame, stamped with a [`hifitime::Epoch`].
//! - [`SatelliteParameters`] – optional physical properties driving the drag term.
//! - [`EnvironmentalData`] – space-weather snapshot driving the density model.
//! - [`GeodeticPosition`] – spherical latitude/longitude (degrees) and altitude (km).
//!
//! Every value here is immutable once built; propagation and filtering always produce
//! a fresh [`OrbitState`].

use hifitime::Epoch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, Kilometer, Meter, DEFAULT_CROSS_SECTIONAL_AREA, DEFAULT_DRAG_COEFFICIENT,
    DEFAULT_MASS, EARTH_EQUATORIAL_RADIUS,
};

/// Cartesian orbital state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// Position in meters
    pub position: Vector3<f64>,
    /// Velocity in m/s
    pub velocity: Vector3<f64>,
    /// Instant at which the state is valid
    pub timestamp: Epoch,
}

impl OrbitState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, timestamp: Epoch) -> Self {
        Self {
            position,
            velocity,
            timestamp,
        }
    }

    /// Build a state from position in km and velocity in km/s, as returned by SGP4.
    pub fn from_km(position_km: [f64; 3], velocity_km_s: [f64; 3], timestamp: Epoch) -> Self {
        Self {
            position: Vector3::from(position_km) * 1000.0,
            velocity: Vector3::from(velocity_km_s) * 1000.0,
            timestamp,
        }
    }

    /// Distance from the Earth center in meters
    pub fn radius(&self) -> Meter {
        self.position.norm()
    }

    /// Geocentric altitude above the equatorial radius in meters
    pub fn altitude(&self) -> Meter {
        self.radius() - EARTH_EQUATORIAL_RADIUS
    }

    /// Speed in m/s
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// `true` when every position and velocity component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.velocity.iter().all(|c| c.is_finite())
    }
}

/// Physical properties of a tracked object used by the drag model.
///
/// Each field is optional; absent values fall back to the defaults 2.2 / 10 m² / 1000 kg
/// only at propagation time, the record itself keeps the `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteParameters {
    pub drag_coefficient: Option<f64>,
    /// Cross-sectional area in m²
    pub cross_sectional_area: Option<f64>,
    /// Mass in kg
    pub mass: Option<f64>,
}

impl SatelliteParameters {
    pub fn new(drag_coefficient: f64, cross_sectional_area: f64, mass: f64) -> Self {
        Self {
            drag_coefficient: Some(drag_coefficient),
            cross_sectional_area: Some(cross_sectional_area),
            mass: Some(mass),
        }
    }

    pub fn drag_coefficient_or_default(&self) -> f64 {
        self.drag_coefficient.unwrap_or(DEFAULT_DRAG_COEFFICIENT)
    }

    pub fn area_or_default(&self) -> f64 {
        self.cross_sectional_area
            .unwrap_or(DEFAULT_CROSS_SECTIONAL_AREA)
    }

    pub fn mass_or_default(&self) -> f64 {
        self.mass.unwrap_or(DEFAULT_MASS)
    }

    /// `true` only when all three physical properties are known.
    pub fn is_complete(&self) -> bool {
        self.drag_coefficient.is_some() && self.cross_sectional_area.is_some() && self.mass.is_some()
    }
}

/// Snapshot of the space-weather indices driving the density model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    /// F10.7 solar radio flux (sfu)
    pub solar_flux: f64,
    pub kp_index: f64,
    pub ap_index: f64,
}

impl EnvironmentalData {
    pub fn new(solar_flux: f64, kp_index: f64, ap_index: f64) -> Self {
        Self {
            solar_flux,
            kp_index,
            ap_index,
        }
    }
}

/// Spherical geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub latitude: Degree,
    pub longitude: Degree,
    /// Altitude above the reference sphere in kilometers
    pub altitude: Kilometer,
}

impl GeodeticPosition {
    pub fn new(latitude: Degree, longitude: Degree, altitude: Kilometer) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}
