//! hp-sizer: end-to-end sizing of central heat-pump water-heating plants.
//!
//! Takes a building description, builds the plant components, sizes the
//! primary analytically, and verifies the recommendation against a
//! design-day simulation, growing the candidate through a bounded ladder
//! when the analytic size falls short. An ASHRAE tabulated path is available
//! as an alternative to the simulation-verified method.

pub mod error;
pub mod inputs;
pub mod sizer;

pub use error::{SizerError, SizerResult};
pub use inputs::{PlantSpec, Schematic};
pub use sizer::{PlantDesign, Sizer};
