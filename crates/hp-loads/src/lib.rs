//! hp-loads: hot-water demand for multifamily buildings.
//!
//! Builds a normalized 24-hour draw profile from occupancy and a
//! gallons-per-day-per-person demand intensity, and locates the peak
//! periods the storage sizing must ride through.

pub mod error;
pub mod occupancy;
pub mod profile;
pub mod tables;

pub use error::{LoadError, LoadResult};
pub use occupancy::{Occupancy, blended_gpdpp};
pub use profile::{LoadProfile, peak_indices, validate_shape};
pub use tables::{BEDROOM_CLASSES, CA_PEOPLE_PER_UNIT, DemandPreset, STREAM_LOAD_SHAPE};
