//! hp-core: stable foundation for the HPWH plant sizing engine.
//!
//! Contains:
//! - units (uom boundary types + imperial constructors and accessors)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
