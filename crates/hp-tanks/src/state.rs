//! Mutable per-tank state threaded through minute steps.

use serde::{Deserialize, Serialize};

/// Whether the heater attached to a tank is firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaterMode {
    Heating,
    Idle,
}

/// State of one tank at a simulation instant. Primary tanks track hot-water
/// volume; temperature-maintenance tanks track bulk temperature. Both fields
/// are carried so traces stay uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankState {
    /// Usable hot water above the aquastat reference, gallons.
    pub volume_gal: f64,
    /// Bulk tank temperature, °F.
    pub temp_f: f64,
    pub mode: HeaterMode,
    /// Minutes the heater has run in the current cycle. Reset on turn-off.
    pub runtime_min: f64,
}

impl TankState {
    pub fn new(volume_gal: f64, temp_f: f64) -> Self {
        Self {
            volume_gal,
            temp_f,
            mode: HeaterMode::Idle,
            runtime_min: 0.0,
        }
    }

    /// Starts a heating cycle, carrying over `elapsed_min` already burned
    /// inside the turn-on step.
    pub fn turn_on(&mut self, elapsed_min: f64) {
        self.mode = HeaterMode::Heating;
        self.runtime_min = elapsed_min;
    }

    pub fn turn_off(&mut self) {
        self.mode = HeaterMode::Idle;
        self.runtime_min = 0.0;
    }

    pub fn is_heating(&self) -> bool {
        self.mode == HeaterMode::Heating
    }
}
