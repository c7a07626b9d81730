//! Hot-water draw profiles over one design day.

use crate::error::{LoadError, LoadResult};
use hp_core::constants::HOURS_PER_DAY;
use hp_core::{hourly_to_minutely, mix_volume};
use serde::{Deserialize, Serialize};

/// Demand intensities above this are not plausible for design sizing.
pub const MAX_GPDPP: f64 = 49.0;

/// Normalized load shapes must sum to 1.0 within this tolerance.
pub const SHAPE_SUM_TOLERANCE: f64 = 1e-3;

/// Reference delivery temperature the gpdpp intensities are published at, °F.
const GPDPP_REFERENCE_F: f64 = 120.0;

/// One design day of hot-water draws, gallons per hour.
///
/// The sum of the hourly draws equals the daily demand; all entries are
/// non-negative. Plain data at the output boundary, safe to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    hourly_gal: Vec<f64>,
    daily_total_gal: f64,
}

impl LoadProfile {
    /// Builds a profile for `n_people` at `gpdpp` gal/day/person, distributed
    /// over the day by the normalized `shape`.
    pub fn build(n_people: f64, gpdpp: f64, shape: &[f64; HOURS_PER_DAY]) -> LoadResult<Self> {
        if !(n_people > 0.0) || !n_people.is_finite() {
            return Err(LoadError::InvalidArg {
                what: "n_people must be positive",
            });
        }
        if !gpdpp.is_finite() || gpdpp <= 0.0 || gpdpp > MAX_GPDPP {
            return Err(LoadError::InvalidDemand {
                gpdpp,
                max_gpdpp: MAX_GPDPP,
            });
        }
        validate_shape(shape)?;

        let daily_total_gal = n_people * gpdpp;
        let hourly_gal = shape.iter().map(|f| f * daily_total_gal).collect();
        Ok(Self {
            hourly_gal,
            daily_total_gal,
        })
    }

    /// Re-expresses the profile at the plant's supply temperature. The
    /// published intensities assume delivery at 120 °F; a different supply
    /// temperature moves a different volume of stored energy.
    pub fn at_supply_temperature(&self, supply_f: f64, incoming_f: f64) -> Self {
        let scale = mix_volume(1.0, supply_f, incoming_f, GPDPP_REFERENCE_F);
        Self {
            hourly_gal: self.hourly_gal.iter().map(|v| v * scale).collect(),
            daily_total_gal: self.daily_total_gal * scale,
        }
    }

    pub fn hourly_gal(&self) -> &[f64] {
        &self.hourly_gal
    }

    pub fn daily_total_gal(&self) -> f64 {
        self.daily_total_gal
    }

    /// Normalized shape of this profile (hourly fractions of the daily total).
    pub fn shape(&self) -> Vec<f64> {
        self.hourly_gal
            .iter()
            .map(|v| v / self.daily_total_gal)
            .collect()
    }

    /// Minute-resolution draws, gallons per minute.
    pub fn minutely_gal(&self) -> Vec<f64> {
        hourly_to_minutely(&self.hourly_gal)
            .into_iter()
            .map(|v| v / 60.0)
            .collect()
    }
}

/// Checks that a 24-hour shape is normalized and non-negative.
pub fn validate_shape(shape: &[f64; HOURS_PER_DAY]) -> LoadResult<()> {
    for (index, value) in shape.iter().enumerate() {
        if *value < 0.0 || !value.is_finite() {
            return Err(LoadError::NegativeShapeEntry {
                index,
                value: *value,
            });
        }
    }
    let sum: f64 = shape.iter().sum();
    if (sum - 1.0).abs() > SHAPE_SUM_TOLERANCE {
        return Err(LoadError::InvalidShape {
            sum,
            tolerance: SHAPE_SUM_TOLERANCE,
        });
    }
    Ok(())
}

/// Indices where a generation-minus-demand series turns from surplus to
/// deficit. Each index marks the first step of a peak the storage must ride
/// through. Exact zeros are treated as (barely) surplus so a flat balance
/// never registers as a peak.
pub fn peak_indices(diff: &[f64]) -> Vec<usize> {
    let sign = |v: f64| if v == 0.0 { 1.0 } else { v.signum() };
    let mut prev = 1.0;
    let mut peaks = Vec::new();
    for (i, &v) in diff.iter().enumerate() {
        let s = sign(v);
        if prev > 0.0 && s < 0.0 {
            peaks.push(i);
        }
        prev = s;
    }
    peaks
}
