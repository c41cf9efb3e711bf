pub mod atmosphere;
pub mod constants;
pub mod integrity;
pub mod kalman;
pub mod propagator;
pub mod providers;
pub mod sattrack_errors;
pub mod space_weather;
pub mod state;
pub mod storage;
pub mod tracking;
pub mod validation;
