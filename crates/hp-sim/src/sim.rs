//! Design-day simulation of a sized plant at minute resolution.

use crate::error::{SimError, SimResult};
use crate::trace::{DepletionEvent, RunStatus, SimulationTrace, TraceRow};
use hp_core::constants::{HOURS_PER_DAY, MINUTES_PER_HOUR};
use hp_core::{is_liquid_water_f, mix_volume};
use hp_loads::LoadProfile;
use hp_tanks::{
    Component, ParallelLoopTank, ParallelStepper, PrimaryStepper, PrimaryTank, SwingStepper,
    TankState,
};
use tracing::debug;

/// Options for a design-day run.
#[derive(Clone, Copy, Debug)]
pub struct SimOptions {
    /// Consecutive design days to run.
    pub days: usize,
    /// Fraction of the primary volume treated as the never-shed safety
    /// floor.
    pub floor_fract: f64,
    /// Initial primary fill as a fraction of total volume.
    pub initial_fill_fract: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            days: 1,
            floor_fract: 0.1,
            initial_fill_fract: 1.0,
        }
    }
}

enum SecondaryRig {
    None,
    Swing {
        stepper: SwingStepper,
        init_temp_f: f64,
    },
    Parallel {
        stepper: ParallelStepper,
        init_temp_f: f64,
        volume_gal: f64,
    },
}

/// Drives a sized plant through repeated design days.
///
/// The simulator itself is immutable: `simulate` is a pure fold over the
/// draw series, so repeated runs from the same inputs give identical traces.
pub struct Simulator<'a> {
    primary: &'a PrimaryTank,
    stepper: PrimaryStepper,
    gen_gal_per_min: f64,
    secondary: SecondaryRig,
    opts: SimOptions,
}

impl<'a> Simulator<'a> {
    /// Builds a simulator for a sized primary plant. A swing tank attached
    /// to the plant is picked up automatically.
    pub fn new(primary: &'a PrimaryTank, opts: SimOptions) -> SimResult<Self> {
        if opts.days == 0 {
            return Err(SimError::InvalidArg {
                what: "simulation needs at least one day",
            });
        }
        if !(0.0 < opts.initial_fill_fract && opts.initial_fill_fract <= 1.0) {
            return Err(SimError::InvalidArg {
                what: "initial fill fraction must be in (0, 1]",
            });
        }
        let stepper = primary.stepper(opts.floor_fract)?;
        let gen_gal_per_min = primary.generation_gal_per_min()?;

        let secondary = match primary.swing_spec() {
            Some(spec) => SecondaryRig::Swing {
                stepper: SwingStepper::new(
                    spec.volume_gal,
                    spec.capacity_kbtu_hr,
                    spec.recirc_loss_w,
                    primary.storage_f(),
                    primary.supply_f(),
                    primary.incoming_f(),
                    primary.supply_f(),
                )?,
                init_temp_f: primary.supply_f() + 0.1,
            },
            None => SecondaryRig::None,
        };

        Ok(Self {
            primary,
            stepper,
            gen_gal_per_min,
            secondary,
            opts,
        })
    }

    /// Attaches a sized parallel-loop tank. Its heater runs independently of
    /// the primary; the trace carries its temperature and duty.
    pub fn with_parallel(mut self, tank: &ParallelLoopTank) -> SimResult<Self> {
        self.secondary = SecondaryRig::Parallel {
            stepper: tank.stepper()?,
            init_temp_f: tank.setpoint_f(),
            volume_gal: tank.volume_gal()?,
        };
        Ok(self)
    }

    /// Runs the design-day loop. The profile must be expressed at the supply
    /// temperature. Depletion clamps the primary at empty and is recorded as
    /// an event; invariant violations end the run as `Failed`.
    pub fn simulate(&self, profile: &LoadProfile) -> SimResult<SimulationTrace> {
        let draws_supply = profile.minutely_gal();
        if draws_supply.len() != HOURS_PER_DAY * MINUTES_PER_HOUR {
            return Err(SimError::InvalidArg {
                what: "profile must cover one 24-hour day",
            });
        }

        let shed: Vec<bool> = match self.primary.load_shift() {
            Some(plan) => plan.allowed().iter().map(|a| !a).collect(),
            None => vec![false; HOURS_PER_DAY],
        };

        let storage_f = self.primary.storage_f();
        let supply_f = self.primary.supply_f();
        let incoming_f = self.primary.incoming_f();

        let mut trace = SimulationTrace::new();
        trace.status = RunStatus::Running;
        debug!(days = self.opts.days, "design-day run started");

        let mut primary_state = TankState::new(
            self.stepper.volume_gal() * self.opts.initial_fill_fract,
            storage_f,
        );
        let mut secondary_state = match &self.secondary {
            SecondaryRig::None => None,
            SecondaryRig::Swing {
                stepper,
                init_temp_f,
            } => Some(TankState::new(stepper.volume_gal(), *init_temp_f)),
            SecondaryRig::Parallel {
                init_temp_f,
                volume_gal,
                ..
            } => Some(TankState::new(*volume_gal, *init_temp_f)),
        };

        let minutes_per_day = HOURS_PER_DAY * MINUTES_PER_HOUR;
        'days: for day in 0..self.opts.days {
            for minute_of_day in 0..minutes_per_day {
                let minute = day * minutes_per_day + minute_of_day;
                let hour = minute_of_day / MINUTES_PER_HOUR;
                let draw_supply = draws_supply[minute_of_day];

                // Secondary first: it decides how much storage-temperature
                // water the demand pulls from the primary.
                let (draw_primary, secondary_temp_f, secondary_ran_fraction) =
                    match (&self.secondary, secondary_state.as_mut()) {
                        (SecondaryRig::None, _) => (
                            mix_volume(draw_supply, storage_f, incoming_f, supply_f),
                            None,
                            None,
                        ),
                        (SecondaryRig::Swing { stepper, .. }, Some(state)) => {
                            let hw_out =
                                mix_volume(draw_supply, state.temp_f, incoming_f, supply_f);
                            let out = stepper.step(state, hw_out);
                            if out.below_supply {
                                trace.status = RunStatus::Failed {
                                    step: minute,
                                    component: Component::Swing,
                                    what: format!(
                                        "swing tank fell to {:.1} °F against a {supply_f} °F supply",
                                        state.temp_f
                                    ),
                                };
                                debug!(minute, temp_f = state.temp_f, "swing below supply");
                                break 'days;
                            }
                            (hw_out, Some(state.temp_f), Some(out.ran_fraction))
                        }
                        (SecondaryRig::Parallel { stepper, .. }, Some(state)) => {
                            let out = stepper.step(state);
                            (
                                mix_volume(draw_supply, storage_f, incoming_f, supply_f),
                                Some(state.temp_f),
                                Some(out.ran_fraction),
                            )
                        }
                        // Rig and state are built together; this arm is
                        // unreachable.
                        (_, None) => (draw_supply, None, None),
                    };

                if let Some(temp) = secondary_temp_f {
                    if !is_liquid_water_f(temp) {
                        trace.status = RunStatus::Failed {
                            step: minute,
                            component: match &self.secondary {
                                SecondaryRig::Parallel { .. } => Component::ParallelLoop,
                                _ => Component::Swing,
                            },
                            what: format!("tank temperature {temp:.1} °F left the liquid range"),
                        };
                        break 'days;
                    }
                }

                let out = self.stepper.step(
                    &mut primary_state,
                    draw_primary,
                    self.gen_gal_per_min,
                    shed[hour],
                );
                if out.depleted_gal > 0.0 {
                    debug!(minute, shortfall = out.depleted_gal, "primary depleted");
                    trace.depletion_events.push(DepletionEvent {
                        minute,
                        shortfall_gal: out.depleted_gal,
                    });
                }
                if primary_state.volume_gal < 0.0 {
                    trace.status = RunStatus::Failed {
                        step: minute,
                        component: Component::Primary,
                        what: "primary volume went negative".to_string(),
                    };
                    break 'days;
                }

                trace.rows.push(TraceRow {
                    minute,
                    primary_volume_gal: primary_state.volume_gal,
                    generated_gal: out.generated_gal,
                    primary_heating: primary_state.is_heating(),
                    draw_gal: draw_primary,
                    secondary_temp_f,
                    secondary_ran_fraction,
                    forced_on: out.forced_on,
                });
            }
        }

        if !trace.status.is_failed() {
            trace.status = RunStatus::Completed;
            debug!(
                rows = trace.rows.len(),
                depleted_gal = trace.total_depleted_gal(),
                "design-day run completed"
            );
        }
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_loads::tables::STREAM_LOAD_SHAPE;

    fn sized_plant(n_people: f64) -> PrimaryTank {
        let profile = LoadProfile::build(n_people, 25.0, &STREAM_LOAD_SHAPE).unwrap();
        let mut tank =
            PrimaryTank::new(&profile, 50.0, 120.0, 150.0, 0.8, 16.0, 0.4, 1.0).unwrap();
        tank.size_vol_cap().unwrap();
        tank
    }

    #[test]
    fn rejects_degenerate_options() {
        let tank = sized_plant(100.0);
        assert!(
            Simulator::new(
                &tank,
                SimOptions {
                    days: 0,
                    ..SimOptions::default()
                },
            )
            .is_err()
        );
        assert!(
            Simulator::new(
                &tank,
                SimOptions {
                    initial_fill_fract: 0.0,
                    ..SimOptions::default()
                },
            )
            .is_err()
        );
    }

    #[test]
    fn unsized_plant_cannot_simulate() {
        let profile = LoadProfile::build(100.0, 25.0, &STREAM_LOAD_SHAPE).unwrap();
        let tank = PrimaryTank::new(&profile, 50.0, 120.0, 150.0, 0.8, 16.0, 0.4, 1.0).unwrap();
        assert!(Simulator::new(&tank, SimOptions::default()).is_err());
    }

    #[test]
    fn trace_covers_every_minute() {
        let tank = sized_plant(100.0);
        let profile = LoadProfile::build(100.0, 25.0, &STREAM_LOAD_SHAPE).unwrap();
        let sim = Simulator::new(&tank, SimOptions::default()).unwrap();
        let trace = sim.simulate(&profile).unwrap();
        assert!(trace.status.is_completed());
        assert_eq!(trace.rows.len(), 1440);
        assert_eq!(trace.rows[0].minute, 0);
        assert_eq!(trace.rows[1439].minute, 1439);
    }
}
