//! Manufacturer performance tables for heat-pump water heaters.

use crate::error::{CurveError, CurveResult};
use hp_core::constants::PRIMARY_MIN_RUNTIME_HR;
use hp_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// Interpolated operating point from an equipment table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityPoint {
    /// Available heating capacity after derate, kBTU/hr.
    pub capacity_kbtu_hr: f64,
    /// Shortest allowed compressor cycle at these conditions, hours.
    pub min_runtime_hr: f64,
    /// Multiplicative derate that was applied (1.0 = none).
    pub derate: f64,
}

/// Tabulated heating capacity over a rectangular grid of ambient air and
/// entering (condenser supply) water temperatures.
///
/// Queries interpolate bilinearly between bracketing rows and columns and
/// refuse conditions outside the grid: extrapolated heat-pump capacity is
/// physically unreliable, so out-of-domain lookups fail instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCurve {
    ambient_f: Vec<f64>,
    supply_f: Vec<f64>,
    /// capacity_kbtu_hr[ambient index][supply index]
    capacity_kbtu_hr: Vec<Vec<f64>>,
    min_runtime_hr: f64,
    defrost_derate: f64,
}

impl EquipmentCurve {
    /// Builds a curve from grid axes (strictly ascending) and a capacity
    /// table with one row per ambient temperature.
    pub fn new(
        ambient_f: Vec<f64>,
        supply_f: Vec<f64>,
        capacity_kbtu_hr: Vec<Vec<f64>>,
    ) -> CurveResult<Self> {
        if ambient_f.len() < 2 || supply_f.len() < 2 {
            return Err(CurveError::InvalidArg {
                what: "each axis needs at least two tabulated temperatures",
            });
        }
        if !strictly_ascending(&ambient_f) || !strictly_ascending(&supply_f) {
            return Err(CurveError::InvalidArg {
                what: "axis temperatures must be strictly ascending",
            });
        }
        if capacity_kbtu_hr.len() != ambient_f.len()
            || capacity_kbtu_hr.iter().any(|row| row.len() != supply_f.len())
        {
            return Err(CurveError::InvalidArg {
                what: "capacity table shape must match the axes",
            });
        }
        if capacity_kbtu_hr
            .iter()
            .flatten()
            .any(|c| !c.is_finite() || *c <= 0.0)
        {
            return Err(CurveError::InvalidArg {
                what: "capacities must be positive and finite",
            });
        }
        Ok(Self {
            ambient_f,
            supply_f,
            capacity_kbtu_hr,
            min_runtime_hr: PRIMARY_MIN_RUNTIME_HR,
            defrost_derate: 1.0,
        })
    }

    /// Sets the defrost derate, a multiplicative factor in (0, 1] applied
    /// after interpolation.
    pub fn with_defrost_derate(mut self, derate: f64) -> CurveResult<Self> {
        if !derate.is_finite() || derate <= 0.0 || derate > 1.0 {
            return Err(CurveError::InvalidArg {
                what: "defrost derate must be in (0, 1]",
            });
        }
        self.defrost_derate = derate;
        Ok(self)
    }

    /// Overrides the minimum compressor runtime, hours.
    pub fn with_min_runtime_hr(mut self, min_runtime_hr: f64) -> CurveResult<Self> {
        if !min_runtime_hr.is_finite() || min_runtime_hr <= 0.0 {
            return Err(CurveError::InvalidArg {
                what: "minimum runtime must be positive",
            });
        }
        self.min_runtime_hr = min_runtime_hr;
        Ok(self)
    }

    /// Largest tabulated capacity after derate, kBTU/hr. An upper bound for
    /// sizing searches.
    pub fn max_capacity_kbtu_hr(&self) -> f64 {
        self.capacity_kbtu_hr
            .iter()
            .flatten()
            .fold(0.0_f64, |m, c| m.max(*c))
            * self.defrost_derate
    }

    /// Interpolated capacity at the given ambient air and entering water
    /// temperatures.
    pub fn capacity_at(&self, ambient_f: f64, supply_f: f64) -> CurveResult<CapacityPoint> {
        ensure_finite(ambient_f, "ambient temperature").map_err(|_| CurveError::InvalidArg {
            what: "ambient temperature must be finite",
        })?;
        ensure_finite(supply_f, "supply temperature").map_err(|_| CurveError::InvalidArg {
            what: "supply temperature must be finite",
        })?;

        let (ai, afrac) = bracket(&self.ambient_f, ambient_f, "ambient")?;
        let (si, sfrac) = bracket(&self.supply_f, supply_f, "supply")?;

        let c00 = self.capacity_kbtu_hr[ai][si];
        let c01 = self.capacity_kbtu_hr[ai][si + 1];
        let c10 = self.capacity_kbtu_hr[ai + 1][si];
        let c11 = self.capacity_kbtu_hr[ai + 1][si + 1];

        let low = c00 + sfrac * (c01 - c00);
        let high = c10 + sfrac * (c11 - c10);
        let capacity = (low + afrac * (high - low)) * self.defrost_derate;

        Ok(CapacityPoint {
            capacity_kbtu_hr: capacity,
            min_runtime_hr: self.min_runtime_hr,
            derate: self.defrost_derate,
        })
    }
}

fn strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1]) && values.iter().all(|v| v.is_finite())
}

/// Bracketing index and fraction for `value` on an ascending axis, or
/// OutOfRange when the value falls outside the tabulated span.
fn bracket(axis: &[f64], value: f64, name: &'static str) -> CurveResult<(usize, f64)> {
    let min = axis[0];
    let max = axis[axis.len() - 1];
    if value < min || value > max {
        return Err(CurveError::OutOfRange {
            axis: name,
            value,
            min,
            max,
        });
    }
    // Right endpoint belongs to the last interval.
    let i = axis.partition_point(|v| *v <= value).min(axis.len() - 1);
    let i = i.saturating_sub(1);
    let frac = (value - axis[i]) / (axis[i + 1] - axis[i]);
    Ok((i, frac))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_curve() -> EquipmentCurve {
        EquipmentCurve::new(
            vec![17.0, 35.0, 67.0, 95.0],
            vec![50.0, 70.0, 90.0],
            vec![
                vec![60.0, 55.0, 50.0],
                vec![80.0, 74.0, 68.0],
                vec![110.0, 102.0, 95.0],
                vec![125.0, 118.0, 110.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn exact_grid_points_round_trip() {
        let curve = sample_curve();
        let p = curve.capacity_at(35.0, 70.0).unwrap();
        assert_eq!(p.capacity_kbtu_hr, 74.0);
        assert_eq!(p.derate, 1.0);
        // Corners, including the right/top edge.
        assert_eq!(curve.capacity_at(17.0, 50.0).unwrap().capacity_kbtu_hr, 60.0);
        assert_eq!(curve.capacity_at(95.0, 90.0).unwrap().capacity_kbtu_hr, 110.0);
    }

    #[test]
    fn bilinear_midpoint() {
        let curve = sample_curve();
        // Midway between (17, 50)..(35, 70): mean of 60, 55, 80, 74.
        let p = curve.capacity_at(26.0, 60.0).unwrap();
        assert!((p.capacity_kbtu_hr - 67.25).abs() < 1e-9);
    }

    #[test]
    fn refuses_extrapolation() {
        let curve = sample_curve();
        let err = curve.capacity_at(0.0, 70.0).unwrap_err();
        assert!(matches!(err, CurveError::OutOfRange { axis: "ambient", .. }));
        let err = curve.capacity_at(35.0, 120.0).unwrap_err();
        assert!(matches!(err, CurveError::OutOfRange { axis: "supply", .. }));
    }

    #[test]
    fn defrost_derate_scales_output() {
        let curve = sample_curve().with_defrost_derate(0.9).unwrap();
        let p = curve.capacity_at(35.0, 70.0).unwrap();
        assert!((p.capacity_kbtu_hr - 74.0 * 0.9).abs() < 1e-12);
        assert_eq!(p.derate, 0.9);
        assert!((curve.max_capacity_kbtu_hr() - 125.0 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(EquipmentCurve::new(vec![17.0], vec![50.0, 70.0], vec![vec![1.0, 2.0]]).is_err());
        assert!(
            EquipmentCurve::new(
                vec![35.0, 17.0],
                vec![50.0, 70.0],
                vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            )
            .is_err()
        );
        assert!(
            EquipmentCurve::new(
                vec![17.0, 35.0],
                vec![50.0, 70.0],
                vec![vec![1.0, 2.0], vec![3.0, -4.0]],
            )
            .is_err()
        );
    }
}
