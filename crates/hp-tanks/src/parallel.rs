//! Parallel-loop tank: a separately heated temperature-maintenance tank that
//! rides the recirculation loop next to the primary storage, sized so its
//! heater can stay off for a chosen window and still reheat within its
//! runtime limit.

use crate::error::{TankError, TankResult};
use crate::result::{Component, CurvePoint, SizingResult};
use crate::state::TankState;
use hp_core::constants::{
    MINUTES_PER_HOUR, RHO_CP_BTU_PER_GAL_F, TM_MIN_RUNTIME_HR, W_TO_BTU_HR,
};
use hp_core::is_liquid_water_f;

/// Number of points on the volume/capacity trade-off curve.
const CURVE_POINTS: usize = 100;

/// Parallel-loop temperature-maintenance tank sizing and stepping.
#[derive(Debug, Clone)]
pub struct ParallelLoopTank {
    n_apt: u32,
    loss_w_per_apt: f64,
    safety_factor: f64,
    setpoint_f: f64,
    on_temp_f: f64,
    /// Window the heater must be able to stay off for, hours.
    off_time_hr: f64,
    /// Allowed reheat runtime, hours.
    runtime_hr: f64,
    sized: Option<(f64, f64)>,
}

impl ParallelLoopTank {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n_apt: u32,
        loss_w_per_apt: f64,
        safety_factor: f64,
        setpoint_f: f64,
        on_temp_f: f64,
        off_time_hr: f64,
        runtime_hr: f64,
    ) -> TankResult<Self> {
        if n_apt == 0 {
            return Err(TankError::InvalidArg {
                what: "parallel-loop tank needs at least one apartment on the loop",
            });
        }
        if !loss_w_per_apt.is_finite() || loss_w_per_apt <= 0.0 {
            return Err(TankError::InvalidArg {
                what: "recirculation loss per apartment must be positive",
            });
        }
        if !safety_factor.is_finite() || safety_factor < 1.0 {
            return Err(TankError::InvalidArg {
                what: "temperature-maintenance safety factor must be at least 1",
            });
        }
        if !is_liquid_water_f(setpoint_f) || !is_liquid_water_f(on_temp_f) {
            return Err(TankError::InvalidArg {
                what: "loop temperatures must be in the liquid range",
            });
        }
        if setpoint_f <= on_temp_f {
            return Err(TankError::InvalidArg {
                what: "loop setpoint must sit above the heater turn-on temperature",
            });
        }
        if !(off_time_hr > 0.0) || !off_time_hr.is_finite() {
            return Err(TankError::InvalidArg {
                what: "heater off window must be positive",
            });
        }
        if !runtime_hr.is_finite() || runtime_hr < TM_MIN_RUNTIME_HR {
            return Err(TankError::InvalidArg {
                what: "reheat runtime must be at least the minimum compressor cycle",
            });
        }
        Ok(Self {
            n_apt,
            loss_w_per_apt,
            safety_factor,
            setpoint_f,
            on_temp_f,
            off_time_hr,
            runtime_hr,
            sized: None,
        })
    }

    pub fn setpoint_f(&self) -> f64 {
        self.setpoint_f
    }

    pub fn on_temp_f(&self) -> f64 {
        self.on_temp_f
    }

    /// Total recirculation loop loss this tank carries, watts.
    pub fn recirc_loss_w(&self) -> f64 {
        self.loss_w_per_apt * f64::from(self.n_apt)
    }

    /// Closed-form sizing: the volume rides out the off window on the band
    /// between setpoint and turn-on, and the capacity carries the loop loss
    /// with a safety factor.
    pub fn size_vol_cap(&mut self) -> TankResult<()> {
        let loss_btu_hr = self.recirc_loss_w() * W_TO_BTU_HR;
        let volume = loss_btu_hr / RHO_CP_BTU_PER_GAL_F * self.off_time_hr
            / (self.setpoint_f - self.on_temp_f);
        let capacity = self.safety_factor * loss_btu_hr / 1000.0;
        self.sized = Some((volume, capacity));
        Ok(())
    }

    pub fn volume_gal(&self) -> TankResult<f64> {
        self.sized.map(|(v, _)| v).ok_or(TankError::NotSized)
    }

    pub fn capacity_kbtu_hr(&self) -> TankResult<f64> {
        self.sized.map(|(_, c)| c).ok_or(TankError::NotSized)
    }

    /// Volume/capacity trade-off at a given reheat runtime: larger tanks need
    /// more capacity to reheat the band within the runtime, and every point
    /// still carries the steady loop loss. Points below the sized capacity
    /// floor are dropped.
    pub fn temp_maint_curve(&self, runtime_hr: f64) -> TankResult<Vec<CurvePoint>> {
        let (sized_vol, sized_cap) = self.sized.ok_or(TankError::NotSized)?;
        if !(runtime_hr > 0.0) || !runtime_hr.is_finite() {
            return Err(TankError::InvalidArg {
                what: "reheat runtime must be positive",
            });
        }
        let loss_btu_hr = self.recirc_loss_w() * W_TO_BTU_HR;
        let top = sized_vol * 4.0;
        let mut curve = Vec::with_capacity(CURVE_POINTS);
        for i in 0..CURVE_POINTS {
            let volume = top * i as f64 / (CURVE_POINTS - 1) as f64;
            let capacity = (RHO_CP_BTU_PER_GAL_F * volume / runtime_hr
                * (self.setpoint_f - self.on_temp_f)
                + loss_btu_hr)
                / 1000.0;
            if capacity >= sized_cap {
                curve.push(CurvePoint {
                    volume_gal: volume,
                    capacity_kbtu_hr: capacity,
                    heat_hours: None,
                });
            }
        }
        Ok(curve)
    }

    pub fn sizing_result(&self) -> TankResult<SizingResult> {
        let (volume, capacity) = self.sized.ok_or(TankError::NotSized)?;
        let curve = self.temp_maint_curve(self.runtime_hr)?;
        let mut result = SizingResult::closed_form(Component::ParallelLoop, volume, capacity);
        result.curve = curve;
        Ok(result)
    }

    /// Minute stepper for the sized tank.
    pub fn stepper(&self) -> TankResult<ParallelStepper> {
        let (volume, capacity) = self.sized.ok_or(TankError::NotSized)?;
        let minutes = MINUTES_PER_HOUR as f64;
        let loss_f_per_min =
            self.recirc_loss_w() * W_TO_BTU_HR / minutes / RHO_CP_BTU_PER_GAL_F / volume;
        let heat_f_per_min = capacity * 1000.0 / minutes / RHO_CP_BTU_PER_GAL_F / volume;
        if heat_f_per_min <= loss_f_per_min {
            return Err(TankError::Infeasible {
                what: "temperature-maintenance heater cannot outpace the loop loss",
                volume_gal: volume,
                capacity_kbtu_hr: capacity,
            });
        }
        Ok(ParallelStepper {
            setpoint_f: self.setpoint_f,
            on_temp_f: self.on_temp_f,
            loss_f_per_min,
            heat_f_per_min,
        })
    }
}

/// Outcome of a single parallel-loop minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallelStepOutcome {
    /// Fraction of the minute the heater fired, in [0, 1].
    pub ran_fraction: f64,
}

/// Explicit per-minute temperature model of the parallel-loop tank: the loop
/// loss cools the bulk every minute, and the heater cycles between the
/// turn-on temperature and the setpoint with sub-minute resolution.
#[derive(Debug, Clone)]
pub struct ParallelStepper {
    setpoint_f: f64,
    on_temp_f: f64,
    loss_f_per_min: f64,
    heat_f_per_min: f64,
}

impl ParallelStepper {
    pub fn step(&self, state: &mut TankState) -> ParallelStepOutcome {
        let mut temp = state.temp_f - self.loss_f_per_min;
        let mut ran = 0.0;
        if state.is_heating() {
            temp += self.heat_f_per_min;
            ran = 1.0;
            state.runtime_min += 1.0;
            if temp > self.setpoint_f {
                let over = ((temp - self.setpoint_f) / self.heat_f_per_min).min(1.0);
                temp -= self.heat_f_per_min * over;
                ran = 1.0 - over;
                state.turn_off();
            }
        } else if temp <= self.on_temp_f {
            let missed = ((self.on_temp_f - temp) / self.heat_f_per_min).min(1.0);
            temp += self.heat_f_per_min * missed;
            ran = missed;
            state.turn_on(missed);
        }
        state.temp_f = temp;
        ParallelStepOutcome { ran_fraction: ran }
    }
}
