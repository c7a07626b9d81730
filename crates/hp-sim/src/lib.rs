//! hp-sim: minute-resolution design-day simulation of a sized plant.
//!
//! The simulator folds a draw profile over the tank steppers: the
//! temperature-maintenance tank first (it decides what the demand pulls from
//! the primary), then the primary with its aquastat, minimum-runtime, and
//! load-shift logic. Depletion is recorded, never raised; invariant
//! violations end the run as `Failed`.

pub mod error;
pub mod sim;
pub mod trace;

pub use error::{SimError, SimResult};
pub use sim::{SimOptions, Simulator};
pub use trace::{DepletionEvent, RunStatus, SimulationTrace, TraceRow};

// Single-step entry points for sizing searches, re-exported so callers need
// only this crate.
pub use hp_tanks::{ParallelStepper, PrimaryStepper, SwingStepper};

use hp_tanks::SwingSeries;

/// Runs only the swing tank against a precomputed minute-resolution draw
/// series at the supply temperature. Swing-aware primary sizing uses this to
/// find the effective load the primary must cover.
pub fn sim_just_swing(
    stepper: &SwingStepper,
    init_temp_f: f64,
    draws_at_supply: &[f64],
) -> SwingSeries {
    stepper.run_series(init_temp_f, draws_at_supply)
}
