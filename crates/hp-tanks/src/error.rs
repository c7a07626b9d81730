//! Error types for tank sizing and stepping.

use hp_curves::CurveError;
use thiserror::Error;

pub type TankResult<T> = Result<T, TankError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TankError {
    #[error("Compressor heating window must be in (0, 24] hours, got {hours}")]
    HeatHoursOutOfRange { hours: f64 },

    #[error("Component has not been sized yet; call size_vol_cap first")]
    NotSized,

    #[error(
        "Swing tank cannot hold supply temperature while sizing: reached {temp_f} °F against a {supply_f} °F supply"
    )]
    SwingUndersized { temp_f: f64, supply_f: f64 },

    #[error(
        "No feasible size within bounds: {what} (reached {volume_gal} gal, {capacity_kbtu_hr} kBTU/hr)"
    )]
    Infeasible {
        what: &'static str,
        volume_gal: f64,
        capacity_kbtu_hr: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Curve(#[from] CurveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_numbers() {
        let err = TankError::SwingUndersized {
            temp_f: 118.2,
            supply_f: 120.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("118.2"));
        assert!(msg.contains("120"));
    }
}
