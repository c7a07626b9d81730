//! Primary heat-pump storage plant: sizing of the central storage volume and
//! heat-pump capacity against a design-day draw profile, plus the minute
//! stepper the simulator drives.
//!
//! Sizing works on the running-volume method: tile the design day twice,
//! walk the generation-minus-demand balance from each surplus-to-deficit
//! turnover, and size the usable storage to the worst cumulative shortfall.

use crate::error::{TankError, TankResult};
use crate::result::{Component, CurvePoint, SizingResult};
use crate::state::TankState;
use crate::swing::{SwingStepper, SwingTank};
use hp_core::constants::{
    HOURS_PER_DAY, MINUTES_PER_HOUR, PRIMARY_MIN_RUNTIME_HR, RHO_CP_BTU_PER_GAL_F,
};
use hp_core::{hourly_to_minutely, is_liquid_water_f, largest_deficit, mix_volume};
use hp_curves::{CapacityPoint, EquipmentCurve};
use hp_loads::profile::{peak_indices, validate_shape};
use hp_loads::LoadProfile;

/// Curve resolution, hours of compressor runtime between points.
const HEAT_HOURS_STEP: f64 = 0.25;

/// Sanity bound on the primary storage volume, gallons. A plant past this is
/// reported infeasible rather than sized.
const MAX_PRIMARY_VOLUME_GAL: f64 = 100_000.0;

/// Swing-tank parameters the primary sizing needs when the plant heats to
/// storage temperature and tempers through a swing tank.
#[derive(Debug, Clone, Copy)]
pub struct SwingSpec {
    pub volume_gal: f64,
    pub capacity_kbtu_hr: f64,
    pub recirc_loss_w: f64,
}

impl SwingSpec {
    /// Captures a sized swing tank.
    pub fn from_tank(tank: &SwingTank) -> TankResult<Self> {
        Ok(Self {
            volume_gal: tank.volume_gal()?,
            capacity_kbtu_hr: tank.capacity_kbtu_hr()?,
            recirc_loss_w: tank.recirc_loss_w(),
        })
    }
}

/// Heat-pump model selection, evaluated once at the plant's design
/// conditions.
#[derive(Debug, Clone)]
struct EquipmentSelection {
    curve: EquipmentCurve,
    design_ambient_f: f64,
    point: CapacityPoint,
}

/// Utility load-shift program: hours the compressor may run, and the
/// fraction of days the plant must cover purely from storage discipline.
#[derive(Debug, Clone)]
pub struct LoadShiftPlan {
    allowed: [bool; HOURS_PER_DAY],
    fract_dhw: f64,
    avg_shape: Option<[f64; HOURS_PER_DAY]>,
}

impl LoadShiftPlan {
    pub fn new(allowed: [bool; HOURS_PER_DAY], fract_dhw: f64) -> TankResult<Self> {
        if !allowed.iter().any(|a| *a) {
            return Err(TankError::InvalidArg {
                what: "load-shift schedule must allow at least one hour",
            });
        }
        if !fract_dhw.is_finite() || !(0.25..=1.0).contains(&fract_dhw) {
            return Err(TankError::InvalidArg {
                what: "load-shift day fraction must be in [0.25, 1]",
            });
        }
        Ok(Self {
            allowed,
            fract_dhw,
            avg_shape: None,
        })
    }

    /// Sets the average-day shape the shifted sizing runs against instead of
    /// the design-day shape.
    pub fn with_average_shape(mut self, shape: [f64; HOURS_PER_DAY]) -> TankResult<Self> {
        validate_shape(&shape).map_err(|_| TankError::InvalidArg {
            what: "load-shift average shape must be normalized and non-negative",
        })?;
        self.avg_shape = Some(shape);
        Ok(self)
    }

    pub fn allowed_hours(&self) -> usize {
        self.allowed.iter().filter(|a| **a).count()
    }

    pub fn allowed(&self) -> &[bool; HOURS_PER_DAY] {
        &self.allowed
    }
}

/// Intermediate result of sizing the storage volume at one heating window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSizing {
    /// Total storage volume at storage temperature, gallons.
    pub volume_gal: f64,
    /// Fraction of the daily load the primary actually generates once the
    /// swing tank covers part of it (1.0 without a swing tank).
    pub eff_swing_fract: f64,
    /// The load-shift day, not the design day, set the volume.
    pub ls_constrained: bool,
    /// The cycling floor, not the running volume, set the volume.
    pub floor_bound: bool,
    /// Generation covered demand in every hour; no running volume needed.
    pub deficit_free: bool,
}

#[derive(Debug, Clone)]
struct SizedPrimary {
    volume_gal: f64,
    capacity_kbtu_hr: f64,
    eff_swing_fract: f64,
    notes: Vec<String>,
}

/// The central heat-pump storage plant.
#[derive(Debug, Clone)]
pub struct PrimaryTank {
    /// Daily hot-water demand at the supply temperature, gallons.
    total_load_gal: f64,
    /// Normalized hourly shape of the design day.
    load_shape: Vec<f64>,
    incoming_f: f64,
    supply_f: f64,
    storage_f: f64,
    percent_useable: f64,
    comp_runtime_hr: f64,
    aqua_fract: f64,
    defrost_factor: f64,
    /// Shortest allowed compressor cycle, hours.
    min_runtime_hr: f64,
    swing: Option<SwingSpec>,
    equipment: Option<EquipmentSelection>,
    load_shift: Option<LoadShiftPlan>,
    /// Longest heating window the plant may use on the design day, hours.
    max_day_run_hr: f64,
    sized: Option<SizedPrimary>,
}

impl PrimaryTank {
    /// Builds a plant from a draw profile already expressed at the supply
    /// temperature.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile: &LoadProfile,
        incoming_f: f64,
        supply_f: f64,
        storage_f: f64,
        percent_useable: f64,
        comp_runtime_hr: f64,
        aqua_fract: f64,
        defrost_factor: f64,
    ) -> TankResult<Self> {
        if !is_liquid_water_f(incoming_f)
            || !is_liquid_water_f(supply_f)
            || !is_liquid_water_f(storage_f)
        {
            return Err(TankError::InvalidArg {
                what: "plant temperatures must be in the liquid range",
            });
        }
        if supply_f > storage_f {
            return Err(TankError::InvalidArg {
                what: "supply temperature cannot exceed storage temperature",
            });
        }
        if incoming_f >= supply_f {
            return Err(TankError::InvalidArg {
                what: "incoming water must be colder than the supply",
            });
        }
        if !(0.0 < percent_useable && percent_useable <= 1.0) {
            return Err(TankError::InvalidArg {
                what: "useable storage fraction must be in (0, 1]",
            });
        }
        if !(0.0 < aqua_fract && aqua_fract < 1.0) {
            return Err(TankError::InvalidArg {
                what: "aquastat fraction must be in (0, 1)",
            });
        }
        if aqua_fract <= 1.0 - percent_useable {
            return Err(TankError::InvalidArg {
                what: "aquastat fraction must exceed the unuseable storage fraction",
            });
        }
        if !(0.0 < comp_runtime_hr && comp_runtime_hr <= 24.0) {
            return Err(TankError::InvalidArg {
                what: "compressor runtime must be in (0, 24] hours",
            });
        }
        if !(0.0 < defrost_factor && defrost_factor <= 1.0) {
            return Err(TankError::InvalidArg {
                what: "defrost factor must be in (0, 1]",
            });
        }
        let load_shape = profile.shape();
        if load_shape.len() != HOURS_PER_DAY {
            return Err(TankError::InvalidArg {
                what: "design profile must cover 24 hours",
            });
        }
        Ok(Self {
            total_load_gal: profile.daily_total_gal(),
            load_shape,
            incoming_f,
            supply_f,
            storage_f,
            percent_useable,
            comp_runtime_hr,
            aqua_fract,
            defrost_factor,
            min_runtime_hr: PRIMARY_MIN_RUNTIME_HR,
            swing: None,
            equipment: None,
            load_shift: None,
            max_day_run_hr: comp_runtime_hr,
            sized: None,
        })
    }

    /// Attaches a swing tank: the primary then heats to storage temperature
    /// and the running-volume analysis runs through the swing tank at minute
    /// resolution.
    pub fn with_swing(mut self, swing: SwingSpec) -> TankResult<Self> {
        if !(swing.volume_gal > 0.0) || !(swing.capacity_kbtu_hr > 0.0) {
            return Err(TankError::InvalidArg {
                what: "swing spec must carry a positive volume and capacity",
            });
        }
        self.swing = Some(swing);
        Ok(self)
    }

    /// Selects the plant's heat-pump equipment from a manufacturer
    /// performance table. The table is queried once at the design ambient
    /// and entering-water temperatures; the resulting operating point
    /// supplies the defrost derate and minimum compressor cycle, and caps
    /// the capacity sizing may ask for. Fails when the design conditions
    /// fall outside the tabulated domain.
    pub fn with_equipment(
        mut self,
        curve: EquipmentCurve,
        design_ambient_f: f64,
    ) -> TankResult<Self> {
        let point = curve.capacity_at(design_ambient_f, self.incoming_f)?;
        self.defrost_factor = point.derate;
        self.min_runtime_hr = point.min_runtime_hr;
        self.equipment = Some(EquipmentSelection {
            curve,
            design_ambient_f,
            point,
        });
        self.sized = None;
        Ok(self)
    }

    /// Applies a load-shift program. The heating window shrinks to the
    /// allowed hours when those are fewer than the compressor runtime.
    pub fn set_load_shift(&mut self, plan: LoadShiftPlan) -> TankResult<()> {
        self.max_day_run_hr = self.comp_runtime_hr.min(plan.allowed_hours() as f64);
        self.load_shift = Some(plan);
        self.sized = None;
        Ok(())
    }

    pub fn max_day_run_hr(&self) -> f64 {
        self.max_day_run_hr
    }

    /// Heat-pump capacity (kBTU/hr) that regenerates the daily load within
    /// the given heating window, after the defrost derate.
    pub fn heat_hours_to_capacity(
        &self,
        heat_hours: f64,
        eff_swing_fract: f64,
    ) -> TankResult<f64> {
        if !heat_hours.is_finite() || heat_hours <= 0.0 || heat_hours > 24.0 {
            return Err(TankError::HeatHoursOutOfRange { hours: heat_hours });
        }
        // With a swing tank the primary heats to storage temperature and
        // only covers its share of the load; without one it heats supply
        // water directly.
        let dt = if self.swing.is_some() {
            self.storage_f - self.incoming_f
        } else {
            self.supply_f - self.incoming_f
        };
        Ok(self.total_load_gal * eff_swing_fract / heat_hours * RHO_CP_BTU_PER_GAL_F * dt
            / self.defrost_factor
            / 1000.0)
    }

    /// Sizes the total storage volume for one heating window.
    pub fn size_tank_volume(&self, heat_hours: f64) -> TankResult<VolumeSizing> {
        if !heat_hours.is_finite() || heat_hours <= 0.0 || heat_hours > 24.0 {
            return Err(TankError::HeatHoursOutOfRange { hours: heat_hours });
        }
        let all_hours = [1.0; HOURS_PER_DAY];
        let (mut run_v, mut eff) = if self.swing.is_some() {
            self.running_volume_swing(heat_hours, &all_hours, &self.load_shape)?
        } else {
            (
                self.running_volume(heat_hours, &all_hours, &self.load_shape),
                1.0,
            )
        };

        let mut ls_constrained = false;
        if let Some(plan) = &self.load_shift {
            let on: Vec<f64> = plan
                .allowed
                .iter()
                .map(|a| if *a { 1.0 } else { 0.0 })
                .collect();
            let shape: Vec<f64> = plan
                .avg_shape
                .map(|s| s.to_vec())
                .unwrap_or_else(|| self.load_shape.clone());
            let (ls_v, ls_eff) = if self.swing.is_some() {
                self.running_volume_swing(heat_hours, &on, &shape)?
            } else {
                (self.running_volume(heat_hours, &on, &shape), 1.0)
            };
            let ls_v = ls_v * plan.fract_dhw;
            if ls_v > run_v {
                run_v = ls_v;
                eff = ls_eff;
                ls_constrained = true;
            }
        }

        let deficit_free = run_v == 0.0;
        let mut volume = self.total_volume_at_storage(run_v);

        // Cycling floor: the usable band between the aquastat and the
        // unuseable fraction must hold at least one minimum compressor cycle
        // of generation.
        let band = self.aqua_fract - (1.0 - self.percent_useable);
        let min_run_vol = self.min_runtime_hr * (self.total_load_gal * eff / heat_hours);
        let mut floor_bound = false;
        if min_run_vol > volume * band {
            volume = min_run_vol / band;
            floor_bound = true;
        }

        if volume > MAX_PRIMARY_VOLUME_GAL {
            return Err(TankError::Infeasible {
                what: "primary storage volume exceeds the plant bound",
                volume_gal: volume,
                capacity_kbtu_hr: self.heat_hours_to_capacity(heat_hours, eff)?,
            });
        }

        Ok(VolumeSizing {
            volume_gal: volume,
            eff_swing_fract: eff,
            ls_constrained,
            floor_bound,
            deficit_free,
        })
    }

    /// Sizes the plant at its heating window and stores the result.
    pub fn size_vol_cap(&mut self) -> TankResult<()> {
        let sizing = self.size_tank_volume(self.max_day_run_hr)?;
        let capacity =
            self.heat_hours_to_capacity(self.max_day_run_hr, sizing.eff_swing_fract)?;
        let mut notes = Vec::new();
        if sizing.ls_constrained {
            notes.push("volume set by the load-shift day, not the design day".to_string());
        }
        if sizing.floor_bound {
            notes.push(format!(
                "volume raised to {:.1} gal so the aquastat band holds a minimum compressor cycle",
                sizing.volume_gal
            ));
        }
        if let Some(eq) = &self.equipment {
            if capacity > eq.point.capacity_kbtu_hr {
                return Err(TankError::Infeasible {
                    what: "selected equipment cannot deliver the required capacity at design conditions",
                    volume_gal: sizing.volume_gal,
                    capacity_kbtu_hr: capacity,
                });
            }
            notes.push(format!(
                "selected equipment delivers {:.1} kBTU/hr at {:.0} °F design ambient",
                eq.point.capacity_kbtu_hr, eq.design_ambient_f
            ));
        }
        self.sized = Some(SizedPrimary {
            volume_gal: sizing.volume_gal,
            capacity_kbtu_hr: capacity,
            eff_swing_fract: sizing.eff_swing_fract,
            notes,
        });
        Ok(())
    }

    /// Scales the stored volume and capacity. Sizing searches use this to
    /// grow a candidate past the analytic recommendation.
    pub fn scale_size(&mut self, factor: f64) -> TankResult<()> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(TankError::InvalidArg {
                what: "size scale factor must be positive",
            });
        }
        let sized = self.sized.as_mut().ok_or(TankError::NotSized)?;
        let capacity = sized.capacity_kbtu_hr * factor;
        if let Some(eq) = &self.equipment {
            if capacity > eq.point.capacity_kbtu_hr {
                return Err(TankError::Infeasible {
                    what: "selected equipment cannot deliver the required capacity at design conditions",
                    volume_gal: sized.volume_gal * factor,
                    capacity_kbtu_hr: capacity,
                });
            }
        }
        sized.volume_gal *= factor;
        sized.capacity_kbtu_hr = capacity;
        Ok(())
    }

    pub fn volume_gal(&self) -> TankResult<f64> {
        self.sized
            .as_ref()
            .map(|s| s.volume_gal)
            .ok_or(TankError::NotSized)
    }

    pub fn capacity_kbtu_hr(&self) -> TankResult<f64> {
        self.sized
            .as_ref()
            .map(|s| s.capacity_kbtu_hr)
            .ok_or(TankError::NotSized)
    }

    pub fn eff_swing_fract(&self) -> TankResult<f64> {
        self.sized
            .as_ref()
            .map(|s| s.eff_swing_fract)
            .ok_or(TankError::NotSized)
    }

    /// Volume/capacity trade-off over heating windows descending from 24
    /// hours. The curve stops once generation covers demand in every hour.
    /// Returns the points and the index of the plant's own heating window
    /// when the curve reaches it.
    pub fn primary_curve(&self) -> TankResult<(Vec<CurvePoint>, Option<usize>)> {
        let shape_max = self
            .load_shape
            .iter()
            .fold(0.0_f64, |m, v| m.max(*v));
        // Below this window the flat generation rate tops the peak hour and
        // no running volume is needed.
        let min_heat_hours = 1.001 / shape_max;

        let mut hours = Vec::new();
        let mut h = 24.0;
        while h > self.max_day_run_hr + 1e-9 {
            hours.push(h);
            h -= HEAT_HOURS_STEP;
        }
        let rec_slot = hours.len();
        h = self.max_day_run_hr;
        while h > 0.0 {
            hours.push(h);
            h -= HEAT_HOURS_STEP;
            if h <= min_heat_hours {
                break;
            }
        }

        let mut points = Vec::with_capacity(hours.len());
        for hh in hours {
            let sizing = self.size_tank_volume(hh)?;
            let capacity = self.heat_hours_to_capacity(hh, sizing.eff_swing_fract)?;
            points.push(CurvePoint {
                volume_gal: sizing.volume_gal,
                capacity_kbtu_hr: capacity,
                heat_hours: Some(hh),
            });
            if sizing.deficit_free {
                break;
            }
        }

        let rec_index = (rec_slot < points.len()).then_some(rec_slot);
        Ok((points, rec_index))
    }

    pub fn sizing_result(&self) -> TankResult<SizingResult> {
        let sized = self.sized.as_ref().ok_or(TankError::NotSized)?;
        let (curve, recommended_index) = self.primary_curve()?;
        Ok(SizingResult {
            component: Component::Primary,
            volume_gal: sized.volume_gal,
            capacity_kbtu_hr: sized.capacity_kbtu_hr,
            curve,
            recommended_index,
            feasible: true,
            notes: sized.notes.clone(),
        })
    }

    /// Minute stepper for the sized plant. `floor_fract` is the fraction of
    /// the total volume treated as the never-shed safety floor.
    pub fn stepper(&self, floor_fract: f64) -> TankResult<PrimaryStepper> {
        let sized = self.sized.as_ref().ok_or(TankError::NotSized)?;
        if !(0.0..1.0).contains(&floor_fract) {
            return Err(TankError::InvalidArg {
                what: "safety floor fraction must be in [0, 1)",
            });
        }
        if floor_fract >= 1.0 - self.aqua_fract {
            return Err(TankError::InvalidArg {
                what: "safety floor must sit below the aquastat trigger",
            });
        }
        Ok(PrimaryStepper {
            volume_gal: sized.volume_gal,
            trigger_gal: sized.volume_gal * (1.0 - self.aqua_fract),
            floor_gal: sized.volume_gal * floor_fract,
            min_runtime_min: self.min_runtime_hr * MINUTES_PER_HOUR as f64,
        })
    }

    /// Generation rate while heating, gallons of storage-temperature water
    /// per minute.
    pub fn generation_gal_per_min(&self) -> TankResult<f64> {
        let sized = self.sized.as_ref().ok_or(TankError::NotSized)?;
        let dt = self.storage_f - self.incoming_f;
        Ok(sized.capacity_kbtu_hr * 1000.0 * self.defrost_factor
            / RHO_CP_BTU_PER_GAL_F
            / dt
            / MINUTES_PER_HOUR as f64)
    }

    pub fn has_swing(&self) -> bool {
        self.swing.is_some()
    }

    pub fn swing_spec(&self) -> Option<SwingSpec> {
        self.swing
    }

    pub fn equipment_curve(&self) -> Option<&EquipmentCurve> {
        self.equipment.as_ref().map(|eq| &eq.curve)
    }

    pub fn min_runtime_hr(&self) -> f64 {
        self.min_runtime_hr
    }

    pub fn supply_f(&self) -> f64 {
        self.supply_f
    }

    pub fn storage_f(&self) -> f64 {
        self.storage_f
    }

    pub fn incoming_f(&self) -> f64 {
        self.incoming_f
    }

    pub fn total_load_gal(&self) -> f64 {
        self.total_load_gal
    }

    pub fn load_shape(&self) -> &[f64] {
        &self.load_shape
    }

    pub fn load_shift(&self) -> Option<&LoadShiftPlan> {
        self.load_shift.as_ref()
    }

    /// Worst cumulative generation-minus-demand shortfall over the design
    /// day, gallons at the supply temperature. Zero when generation covers
    /// every hour.
    fn running_volume(&self, heat_hours: f64, on_off: &[f64], shape: &[f64]) -> f64 {
        let n = shape.len();
        let mut diff = Vec::with_capacity(2 * n);
        for _ in 0..2 {
            for i in 0..n {
                diff.push(on_off[i] / heat_hours - shape[i]);
            }
        }
        let peaks = peak_indices(&diff[..n]);
        let mut worst: f64 = 0.0;
        for peak in peaks {
            worst = worst.max(largest_deficit(&diff[peak..]));
        }
        worst * self.total_load_gal
    }

    /// Swing-tank variant at minute resolution: demand is drawn through the
    /// swing tank, so the primary sees the storage-temperature outflow and a
    /// reduced effective load. Returns (running volume at storage
    /// temperature, effective load fraction).
    fn running_volume_swing(
        &self,
        heat_hours: f64,
        on_off: &[f64],
        shape: &[f64],
    ) -> TankResult<(f64, f64)> {
        let swing = self.swing.as_ref().ok_or(TankError::InvalidArg {
            what: "swing sizing requires a swing spec",
        })?;
        let stepper = SwingStepper::new(
            swing.volume_gal,
            swing.capacity_kbtu_hr,
            swing.recirc_loss_w,
            self.storage_f,
            self.supply_f,
            self.incoming_f,
            self.supply_f,
        )?;

        let n = shape.len();
        let mut r#gen = Vec::with_capacity(2 * n);
        let mut demand = Vec::with_capacity(2 * n);
        for _ in 0..2 {
            for i in 0..n {
                r#gen.push(on_off[i] / heat_hours);
                demand.push(shape[i]);
            }
        }
        let diff: Vec<f64> = r#gen.iter().zip(&demand).map(|(g, d)| g - d).collect();

        // Candidate windows start at each surplus-to-deficit turnover and
        // one hour after it; the minute-resolution balance can bottom out in
        // either.
        let mut starts = Vec::new();
        for p in peak_indices(&diff[..n]) {
            starts.push(p);
            if p + 1 < n {
                starts.push(p + 1);
            }
        }
        starts.dedup();

        let minutes = MINUTES_PER_HOUR as f64;
        let mut worst = 0.0_f64;
        let mut worst_eff = 1.0_f64;
        for start in starts {
            let window: Vec<f64> = hourly_to_minutely(&demand[start..start + n])
                .into_iter()
                .map(|v| v * self.total_load_gal / minutes)
                .collect();
            let series = stepper.run_series(self.supply_f + 0.1, &window);
            if let Some(minute) = series.below_supply_at {
                return Err(TankError::SwingUndersized {
                    temp_f: series.temp_f[minute],
                    supply_f: self.supply_f,
                });
            }
            let out_total: f64 = series.outflow_gal.iter().sum();
            let eff = out_total / self.total_load_gal;

            let gen_min: Vec<f64> = hourly_to_minutely(&r#gen[start..start + n])
                .into_iter()
                .map(|v| v * self.total_load_gal * eff / minutes)
                .collect();
            let balance: Vec<f64> = gen_min
                .iter()
                .zip(&series.outflow_gal)
                .map(|(g, o)| g - o)
                .collect();
            let deficit = largest_deficit(&balance);
            if deficit > worst {
                worst = deficit;
                worst_eff = eff;
            }
        }
        Ok((worst, worst_eff))
    }

    /// Converts a running volume into total storage above the aquastat.
    /// With a swing tank the running volume is already at storage
    /// temperature; without one it is tempered supply water.
    fn total_volume_at_storage(&self, run_v: f64) -> f64 {
        let at_storage = if self.swing.is_some() {
            run_v
        } else {
            mix_volume(run_v, self.storage_f, self.incoming_f, self.supply_f)
        };
        at_storage / (1.0 - self.aqua_fract)
    }
}

/// Outcome of one primary-tank minute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrimaryStepOutcome {
    /// Hot water actually generated this minute, gallons at storage
    /// temperature.
    pub generated_gal: f64,
    /// Demand that found an empty tank, gallons. Zero when none.
    pub depleted_gal: f64,
    /// The safety floor overrode a load-shift shed and forced heating.
    pub forced_on: bool,
}

/// Minute stepper for the primary storage. Volume-based aquastat control
/// with sub-minute turn-on/turn-off, a minimum compressor cycle, and a
/// safety floor that overrides load-shift shedding.
#[derive(Debug, Clone)]
pub struct PrimaryStepper {
    volume_gal: f64,
    trigger_gal: f64,
    floor_gal: f64,
    min_runtime_min: f64,
}

impl PrimaryStepper {
    pub fn volume_gal(&self) -> f64 {
        self.volume_gal
    }

    pub fn trigger_gal(&self) -> f64 {
        self.trigger_gal
    }

    pub fn floor_gal(&self) -> f64 {
        self.floor_gal
    }

    /// Advances one minute. `draw_gal` leaves the tank, `gen_gal` is the
    /// compressor's full-minute output, and `shed` marks a load-shift hour
    /// where the compressor should stay off.
    pub fn step(
        &self,
        state: &mut TankState,
        draw_gal: f64,
        gen_gal: f64,
        shed: bool,
    ) -> PrimaryStepOutcome {
        let mut out = PrimaryStepOutcome::default();

        // A shed hour stops an active burn once the minimum cycle is done,
        // unless the tank is at the safety floor.
        if state.is_heating()
            && shed
            && state.volume_gal > self.floor_gal
            && state.runtime_min >= self.min_runtime_min
        {
            state.turn_off();
        }

        let mut volume;
        if state.is_heating() {
            volume = state.volume_gal - draw_gal + gen_gal;
            let mut generated = gen_gal;
            state.runtime_min += 1.0;
            if volume > self.volume_gal {
                if state.runtime_min < self.min_runtime_min || gen_gal <= draw_gal {
                    // Cycle must finish: hold at full, generating only the
                    // replacement.
                    generated = gen_gal - (volume - self.volume_gal);
                    volume = self.volume_gal;
                } else {
                    // Partial step: burn until full, then coast on draws.
                    let time_over = ((volume - self.volume_gal) / (gen_gal - draw_gal)).min(1.0);
                    volume = self.volume_gal - draw_gal * time_over;
                    generated = gen_gal * (1.0 - time_over);
                    state.turn_off();
                }
            }
            out.generated_gal = generated;
        } else {
            volume = state.volume_gal - draw_gal;
            let breached_floor = volume <= self.floor_gal;
            if (volume < self.trigger_gal && !shed) || breached_floor {
                // Partial step: heat for the slice of the minute spent below
                // the trigger.
                let missed = if draw_gal > 0.0 {
                    ((self.trigger_gal - volume) / draw_gal).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                volume += gen_gal * missed;
                out.generated_gal = gen_gal * missed;
                state.turn_on(missed);
                out.forced_on = breached_floor && shed;
            }
        }

        if volume < 0.0 {
            out.depleted_gal = -volume;
            volume = 0.0;
        }
        state.volume_gal = volume.min(self.volume_gal);
        out
    }
}
