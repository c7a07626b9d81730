//! hp-curves: equipment performance tables and ASHRAE sizing curves.
//!
//! The heat pump is a black box characterized by manufacturer capacity
//! tables; this crate interpolates those tables (refusing to extrapolate)
//! and implements the tabulated ASHRAE low/medium demand sizing method.

pub mod ashrae;
pub mod equipment;
pub mod error;

pub use ashrae::{AshraeSizer, DemandStandard};
pub use equipment::{CapacityPoint, EquipmentCurve};
pub use error::{CurveError, CurveResult};
