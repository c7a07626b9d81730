//! Building description and plant configuration inputs.

use crate::error::{SizerError, SizerResult};
use hp_core::constants::{HOURS_PER_DAY, TM_MIN_RUNTIME_HR};
use hp_core::is_liquid_water_f;
use hp_curves::EquipmentCurve;
use hp_loads::profile::MAX_GPDPP;
use hp_loads::tables::STREAM_LOAD_SHAPE;
use hp_loads::{Occupancy, validate_shape};
use hp_tanks::{LoadShiftPlan, SwingSizingTable};
use serde::{Deserialize, Serialize};

/// Plant arrangement: who carries the recirculation loop losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schematic {
    /// Primary storage only; no recirculation loop modeled.
    Primary,
    /// Swing tank in series with the supply.
    SwingTank,
    /// Separately heated tank in parallel on the loop.
    ParallelLoop,
}

/// Full description of the building and the plant to size.
///
/// Construct with [`PlantSpec::new`] and adjust public fields; [`Sizer`]
/// validates the whole description before sizing.
///
/// [`Sizer`]: crate::Sizer
#[derive(Debug, Clone)]
pub struct PlantSpec {
    pub occupancy: Occupancy,
    /// Demand intensity, gal/day/person at 120 °F.
    pub gpdpp: f64,
    /// Normalized 24-hour draw shape.
    pub load_shape: [f64; HOURS_PER_DAY],
    pub incoming_f: f64,
    pub supply_f: f64,
    pub storage_f: f64,
    /// Fraction of the storage volume that is actually deliverable.
    pub percent_useable: f64,
    /// Aquastat position as a fraction of tank height.
    pub aqua_fract: f64,
    /// Allowed compressor runtime on the design day, hours.
    pub comp_runtime_hr: f64,
    /// Multiplicative capacity derate for defrost cycles, (0, 1]. Ignored
    /// when an equipment table is selected; the table's derate governs.
    pub defrost_factor: f64,
    /// Manufacturer performance table for the selected heat-pump model.
    pub equipment: Option<EquipmentCurve>,
    /// Outdoor design temperature the equipment table is queried at, °F.
    pub design_ambient_f: f64,
    pub schematic: Schematic,
    /// Recirculation loop loss per apartment, watts.
    pub loss_w_per_apt: f64,
    /// Safety factor on temperature-maintenance capacity.
    pub safety_factor_tm: f64,
    pub swing_table: SwingSizingTable,
    /// Parallel-loop setpoint and heater turn-on temperatures, °F.
    pub loop_setpoint_f: f64,
    pub loop_on_temp_f: f64,
    /// Window the parallel-loop heater must stay off for, hours.
    pub loop_off_time_hr: f64,
    /// Allowed parallel-loop reheat runtime, hours.
    pub tm_runtime_hr: f64,
    pub load_shift: Option<LoadShiftPlan>,
}

impl PlantSpec {
    /// A spec with customary defaults for the given building and schematic.
    pub fn new(occupancy: Occupancy, gpdpp: f64, schematic: Schematic) -> Self {
        Self {
            occupancy,
            gpdpp,
            load_shape: STREAM_LOAD_SHAPE,
            incoming_f: 50.0,
            supply_f: 120.0,
            storage_f: 150.0,
            percent_useable: 0.8,
            aqua_fract: 0.4,
            comp_runtime_hr: 16.0,
            defrost_factor: 1.0,
            equipment: None,
            design_ambient_f: 61.0,
            schematic,
            loss_w_per_apt: 100.0,
            safety_factor_tm: 1.75,
            swing_table: SwingSizingTable::California,
            loop_setpoint_f: 130.0,
            loop_on_temp_f: 120.0,
            loop_off_time_hr: 0.5,
            tm_runtime_hr: 1.0,
            load_shift: None,
        }
    }

    /// Checks the whole description. Component constructors re-check what
    /// they own; this catches inconsistencies before anything is built.
    pub fn validate(&self) -> SizerResult<()> {
        if !self.gpdpp.is_finite() || self.gpdpp <= 0.0 || self.gpdpp > MAX_GPDPP {
            return Err(SizerError::InvalidInput {
                what: "demand intensity must be positive and plausible",
            });
        }
        validate_shape(&self.load_shape).map_err(|_| SizerError::InvalidInput {
            what: "load shape must be normalized and non-negative",
        })?;
        if !is_liquid_water_f(self.incoming_f)
            || !is_liquid_water_f(self.supply_f)
            || !is_liquid_water_f(self.storage_f)
        {
            return Err(SizerError::InvalidInput {
                what: "temperatures must be in the liquid range",
            });
        }
        if self.supply_f > self.storage_f {
            return Err(SizerError::InvalidInput {
                what: "supply temperature cannot exceed storage temperature",
            });
        }
        if self.incoming_f >= self.supply_f {
            return Err(SizerError::InvalidInput {
                what: "incoming water must be colder than the supply",
            });
        }
        if !(0.0 < self.percent_useable && self.percent_useable <= 1.0) {
            return Err(SizerError::InvalidInput {
                what: "useable storage fraction must be in (0, 1]",
            });
        }
        if !(0.0 < self.aqua_fract && self.aqua_fract < 1.0)
            || self.aqua_fract <= 1.0 - self.percent_useable
        {
            return Err(SizerError::InvalidInput {
                what: "aquastat fraction must exceed the unuseable storage fraction",
            });
        }
        if !(0.0 < self.comp_runtime_hr && self.comp_runtime_hr <= 24.0) {
            return Err(SizerError::InvalidInput {
                what: "compressor runtime must be in (0, 24] hours",
            });
        }
        if !(0.0 < self.defrost_factor && self.defrost_factor <= 1.0) {
            return Err(SizerError::InvalidInput {
                what: "defrost factor must be in (0, 1]",
            });
        }
        if self.equipment.is_some() && !self.design_ambient_f.is_finite() {
            return Err(SizerError::InvalidInput {
                what: "design ambient temperature must be finite",
            });
        }
        if self.schematic != Schematic::Primary {
            if !self.loss_w_per_apt.is_finite() || self.loss_w_per_apt <= 0.0 {
                return Err(SizerError::InvalidInput {
                    what: "recirculation loss per apartment must be positive",
                });
            }
            if !self.safety_factor_tm.is_finite() || self.safety_factor_tm < 1.0 {
                return Err(SizerError::InvalidInput {
                    what: "temperature-maintenance safety factor must be at least 1",
                });
            }
        }
        if self.schematic == Schematic::ParallelLoop {
            if self.loop_setpoint_f <= self.loop_on_temp_f {
                return Err(SizerError::InvalidInput {
                    what: "loop setpoint must sit above the heater turn-on temperature",
                });
            }
            if self.tm_runtime_hr < TM_MIN_RUNTIME_HR {
                return Err(SizerError::InvalidInput {
                    what: "reheat runtime must be at least the minimum compressor cycle",
                });
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn spec() -> PlantSpec {
        PlantSpec::new(
            Occupancy::from_people(100.0, 36).unwrap(),
            25.0,
            Schematic::Primary,
        )
    }

    proptest! {
        #[test]
        fn implausible_demand_never_validates(gpdpp in 50.0..500.0f64) {
            let mut s = spec();
            s.gpdpp = gpdpp;
            prop_assert!(s.validate().is_err());
        }

        #[test]
        fn aquastat_inside_the_unuseable_band_never_validates(
            percent_useable in 0.05..0.95f64,
            slack in 0.0..0.5f64,
        ) {
            let mut s = spec();
            s.percent_useable = percent_useable;
            s.aqua_fract = (1.0 - percent_useable) * (1.0 - slack);
            prop_assert!(s.validate().is_err());
        }

        #[test]
        fn plausible_runtime_windows_validate(comp_runtime_hr in 0.5..24.0f64) {
            let mut s = spec();
            s.comp_runtime_hr = comp_runtime_hr;
            prop_assert!(s.validate().is_ok());
        }
    }
}
