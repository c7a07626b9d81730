//! Occupancy and unit-count conversions.

use crate::error::{LoadError, LoadResult};
use crate::tables::BEDROOM_CLASSES;

/// Building occupancy: total people served and apartment count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupancy {
    pub n_people: f64,
    pub n_units: u32,
}

impl Occupancy {
    /// Occupancy from direct people and unit counts.
    pub fn from_people(n_people: f64, n_units: u32) -> LoadResult<Self> {
        if !(n_people > 0.0) || !n_people.is_finite() {
            return Err(LoadError::InvalidArg {
                what: "n_people must be positive",
            });
        }
        if n_units == 0 {
            return Err(LoadError::InvalidArg {
                what: "n_units must be positive",
            });
        }
        Ok(Self { n_people, n_units })
    }

    /// Occupancy from unit counts by bedroom class (studios through 5+ BR)
    /// and average people per unit for each class.
    pub fn from_units(
        n_br: &[u32; BEDROOM_CLASSES],
        people_per_unit: &[f64; BEDROOM_CLASSES],
    ) -> LoadResult<Self> {
        let n_units: u32 = n_br.iter().sum();
        if n_units == 0 {
            return Err(LoadError::InvalidArg {
                what: "at least one unit is required",
            });
        }
        if people_per_unit.iter().any(|r| *r < 0.0 || !r.is_finite()) {
            return Err(LoadError::InvalidArg {
                what: "people per unit ratios must be non-negative",
            });
        }
        let n_people: f64 = n_br
            .iter()
            .zip(people_per_unit)
            .map(|(n, r)| f64::from(*n) * r)
            .sum();
        if n_people <= 0.0 {
            return Err(LoadError::InvalidArg {
                what: "occupancy works out to zero people",
            });
        }
        Ok(Self { n_people, n_units })
    }
}

/// People-weighted average demand intensity when gpdpp differs by bedroom
/// class.
pub fn blended_gpdpp(
    n_br: &[u32; BEDROOM_CLASSES],
    people_per_unit: &[f64; BEDROOM_CLASSES],
    gpdpp_br: &[f64; BEDROOM_CLASSES],
) -> LoadResult<f64> {
    let occupancy = Occupancy::from_units(n_br, people_per_unit)?;
    let weighted: f64 = n_br
        .iter()
        .zip(people_per_unit)
        .zip(gpdpp_br)
        .map(|((n, r), g)| f64::from(*n) * r * g)
        .sum();
    Ok(weighted / occupancy.n_people)
}
