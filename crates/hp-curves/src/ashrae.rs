//! ASHRAE tabulated sizing method for service water heating.
//!
//! Peak-draw tables give gallons per person expected within a window of 5
//! minutes up to a full day, for the low and medium demand occupancy
//! classes. Intermediate demand intensities interpolate between the two
//! tables; anything outside them is refused.

use crate::error::{CurveError, CurveResult};
use hp_core::constants::{RHO_CP_BTU_PER_GAL_F, TONS_TO_KBTU_HR};
use hp_core::interp;

/// Peak windows tabulated by the standard, minutes.
const PEAK_MINUTES: [f64; 7] = [5.0, 15.0, 30.0, 60.0, 120.0, 180.0, 1440.0];

/// Low-demand occupancy class, gallons per person within each window.
const LOW_GAL_PER_PERSON: [f64; 7] = [0.4, 1.0, 1.7, 2.8, 4.5, 6.1, 20.0];

/// Medium-demand occupancy class, gallons per person within each window.
const MEDIUM_GAL_PER_PERSON: [f64; 7] = [0.7, 1.7, 2.9, 4.8, 8.0, 11.0, 49.0];

/// Compressor run times the daily-recovery table is expressed at, hours.
const RECOVERY_HOURS: [f64; 7] = [1.0, 2.0, 4.0, 8.0, 12.0, 16.0, 24.0];

/// Demand class selecting (or interpolating between) the tabulated curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemandStandard {
    Low,
    Medium,
    /// Intensity between the tabulated classes, gal/day/person.
    Gpdpp(f64),
}

impl DemandStandard {
    /// Daily demand intensity for this class, gal/day/person.
    pub fn gpdpp(self) -> f64 {
        match self {
            DemandStandard::Low => LOW_GAL_PER_PERSON[6],
            DemandStandard::Medium => MEDIUM_GAL_PER_PERSON[6],
            DemandStandard::Gpdpp(g) => g,
        }
    }
}

/// One row of the working peak-flow table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakFlowRow {
    pub minutes: f64,
    pub gal_per_person: f64,
}

/// Sizes the primary plant with the ASHRAE tabulated method.
#[derive(Debug, Clone)]
pub struct AshraeSizer {
    n_people: f64,
    supply_f: f64,
    incoming_f: f64,
    storage_f: f64,
    percent_useable: f64,
    comp_runtime_hr: f64,
    table: [PeakFlowRow; 7],
}

impl AshraeSizer {
    pub fn new(
        n_people: f64,
        standard: DemandStandard,
        supply_f: f64,
        incoming_f: f64,
        storage_f: f64,
        percent_useable: f64,
        comp_runtime_hr: f64,
    ) -> CurveResult<Self> {
        if !(n_people > 0.0) || !n_people.is_finite() {
            return Err(CurveError::InvalidArg {
                what: "n_people must be positive",
            });
        }
        if !(0.0 < percent_useable && percent_useable <= 1.0) {
            return Err(CurveError::InvalidArg {
                what: "percent_useable must be in (0, 1]",
            });
        }
        if !(0.0 < comp_runtime_hr && comp_runtime_hr <= 24.0) {
            return Err(CurveError::InvalidArg {
                what: "comp_runtime_hr must be in (0, 24]",
            });
        }
        if !(incoming_f < supply_f && supply_f <= storage_f) {
            return Err(CurveError::InvalidArg {
                what: "temperatures must satisfy incoming < supply <= storage",
            });
        }
        let table = peak_flow_table(standard)?;
        Ok(Self {
            n_people,
            supply_f,
            incoming_f,
            storage_f,
            percent_useable,
            comp_runtime_hr,
            table,
        })
    }

    /// The low-demand tabulated curve.
    pub fn low_curve() -> [PeakFlowRow; 7] {
        zip_table(&LOW_GAL_PER_PERSON)
    }

    /// The medium-demand tabulated curve.
    pub fn medium_curve() -> [PeakFlowRow; 7] {
        zip_table(&MEDIUM_GAL_PER_PERSON)
    }

    /// The working table for this building's demand class.
    pub fn peak_flow_table(&self) -> &[PeakFlowRow; 7] {
        &self.table
    }

    /// Sizing curve: storage volume (gallons at storage temperature) paired
    /// with the recovery capacity (tons) that makes that volume sufficient.
    /// Volume ascends along the curve while the required tons descend.
    pub fn primary_curve(&self) -> (Vec<f64>, Vec<f64>) {
        let dt_store = self.storage_f - self.incoming_f;
        let dt_supply = self.supply_f - self.incoming_f;

        let volumes: Vec<f64> = self
            .table
            .iter()
            .map(|row| row.gal_per_person * self.n_people / self.percent_useable * dt_supply / dt_store)
            .collect();

        // Recovery rate between consecutive windows; the final window reuses
        // the last finite difference.
        let mut tons = Vec::with_capacity(self.table.len());
        for i in 0..self.table.len() {
            let (a, b) = if i + 1 < self.table.len() {
                (self.table[i], self.table[i + 1])
            } else {
                (self.table[i - 1], self.table[i])
            };
            let gal_per_min = (b.gal_per_person - a.gal_per_person) / (b.minutes - a.minutes);
            tons.push(self.n_people * gal_per_min * 60.0 * RHO_CP_BTU_PER_GAL_F * dt_store / 12000.0);
        }

        (volumes, tons)
    }

    /// Recovery capacity (tons) needed to regenerate the full daily draw
    /// within the allowed compressor runtime.
    pub fn tons_recovery_for_max_daily(&self) -> f64 {
        let daily_gal_per_person = self.table[6].gal_per_person;
        let dt_supply = self.supply_f - self.incoming_f;
        let tons_by_hours: Vec<f64> = RECOVERY_HOURS
            .iter()
            .map(|h| daily_gal_per_person * self.n_people * RHO_CP_BTU_PER_GAL_F * dt_supply / 12000.0 / h)
            .collect();
        interp(self.comp_runtime_hr, &RECOVERY_HOURS, &tons_by_hours)
    }

    /// Recommended (volume, capacity) pair: capacity from the daily-recovery
    /// requirement, volume from the sizing curve at that capacity.
    pub fn size_vol_cap(&self) -> CurveResult<(f64, f64)> {
        let tons = self.tons_recovery_for_max_daily();
        let (volumes, curve_tons) = self.primary_curve();

        // The curve descends in tons as volume grows; reverse both for the
        // ascending-axis interpolation.
        let mut tons_asc = curve_tons.clone();
        tons_asc.reverse();
        let mut vol_desc = volumes.clone();
        vol_desc.reverse();
        let volume = interp(tons, &tons_asc, &vol_desc);

        Ok((volume, tons * TONS_TO_KBTU_HR))
    }
}

fn zip_table(gal_per_person: &[f64; 7]) -> [PeakFlowRow; 7] {
    let mut rows = [PeakFlowRow {
        minutes: 0.0,
        gal_per_person: 0.0,
    }; 7];
    for (i, row) in rows.iter_mut().enumerate() {
        *row = PeakFlowRow {
            minutes: PEAK_MINUTES[i],
            gal_per_person: gal_per_person[i],
        };
    }
    rows
}

/// Working table for a demand class. Intermediate intensities blend the low
/// and medium tables linearly by daily total.
fn peak_flow_table(standard: DemandStandard) -> CurveResult<[PeakFlowRow; 7]> {
    match standard {
        DemandStandard::Low => Ok(AshraeSizer::low_curve()),
        DemandStandard::Medium => Ok(AshraeSizer::medium_curve()),
        DemandStandard::Gpdpp(gpdpp) => {
            if !gpdpp.is_finite() || gpdpp < LOW_GAL_PER_PERSON[6] || gpdpp > MEDIUM_GAL_PER_PERSON[6]
            {
                return Err(CurveError::UnsupportedStandard {
                    what: format!(
                        "gpdpp {gpdpp} outside the tabulated span {} to {}",
                        LOW_GAL_PER_PERSON[6], MEDIUM_GAL_PER_PERSON[6]
                    ),
                });
            }
            let frac = (gpdpp - LOW_GAL_PER_PERSON[6])
                / (MEDIUM_GAL_PER_PERSON[6] - LOW_GAL_PER_PERSON[6]);
            let mut rows = AshraeSizer::low_curve();
            for (i, row) in rows.iter_mut().enumerate() {
                row.gal_per_person += frac * (MEDIUM_GAL_PER_PERSON[i] - LOW_GAL_PER_PERSON[i]);
            }
            Ok(rows)
        }
    }
}
