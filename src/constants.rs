//! # Constants and type definitions for sattrack
//!
//! This module centralizes the **physical constants**, **numeric floors** and **common type
//! aliases** used across the tracking pipeline.
//!
//! ## Overview
//!
//! - Earth gravitational parameter and the two Earth radii in use
//! - Drag ceiling, density floor and accuracy floor
//! - Method tags attached to stored estimates
//! - Unit aliases shared by the propagator, the filter and the validator
//!
//! Two Earth radii coexist on purpose: the propagator measures altitude against the
//! equatorial radius ([`EARTH_EQUATORIAL_RADIUS`]), while the validator computes great-circle
//! distances on the mean sphere ([`EARTH_MEAN_RADIUS`]). Validation numbers depend on both.

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// Earth gravitational parameter μ in m³/s²
pub const MU_EARTH: f64 = 3.986004418e14;

/// Earth equatorial radius in meters (WGS84), used for altitudes in the propagator
pub const EARTH_EQUATORIAL_RADIUS: Meter = 6_378_137.0;

/// Earth mean radius in meters, used by the haversine distance of the validator
pub const EARTH_MEAN_RADIUS: Meter = 6_371_000.0;

/// Altitude above which atmospheric drag is ignored (2000 km)
pub const DRAG_ALTITUDE_CEILING: Meter = 2_000_000.0;

/// Lower bound of the atmospheric density estimate in kg/m³
pub const MIN_ATMOSPHERIC_DENSITY: f64 = 1e-15;

/// Theoretical floor of the accuracy heuristic in meters
pub const ACCURACY_FLOOR: Meter = 150.0;

/// Base element-set accuracy before any modelling improvement, in meters
pub const BASE_TLE_ACCURACY: Meter = 2500.0;

/// Number of seconds in one hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Meters in one kilometer
pub const METERS_PER_KM: f64 = 1000.0;

// -------------------------------------------------------------------------------------------------
// Satellite defaults
// -------------------------------------------------------------------------------------------------

/// Drag coefficient used when a satellite record carries none
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 2.2;

/// Cross-sectional area in m² used when a satellite record carries none
pub const DEFAULT_CROSS_SECTIONAL_AREA: f64 = 10.0;

/// Mass in kg used when a satellite record carries none
pub const DEFAULT_MASS: f64 = 1000.0;

// -------------------------------------------------------------------------------------------------
// Method tags
// -------------------------------------------------------------------------------------------------

/// Propagation with the enhanced (gravity + drag) model
pub const METHOD_ENHANCED: &str = "enhanced";

/// Enhanced propagation smoothed by the per-object filter
pub const METHOD_ENHANCED_KALMAN: &str = "enhanced+kalman";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Duration in seconds
pub type Seconds = f64;

/// Identifier of a tracked object (NORAD catalog number as text, e.g. `"25544"`)
pub type ObjectId = String;
