//! Error types for plant sizing.

use hp_curves::CurveError;
use hp_loads::LoadError;
use hp_sim::SimError;
use hp_tanks::TankError;
use thiserror::Error;

pub type SizerResult<T> = Result<T, SizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SizerError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: &'static str },

    #[error(
        "No feasible plant size: {what} (best attempt {best_volume_gal:.0} gal, {best_capacity_kbtu_hr:.1} kBTU/hr)"
    )]
    Infeasible {
        what: String,
        best_volume_gal: f64,
        best_capacity_kbtu_hr: f64,
        failing_step: Option<usize>,
    },

    #[error(transparent)]
    Tank(#[from] TankError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Curve(#[from] CurveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_reports_best_attempt() {
        let err = SizerError::Infeasible {
            what: "depletion persisted".to_string(),
            best_volume_gal: 5400.0,
            best_capacity_kbtu_hr: 310.2,
            failing_step: Some(512),
        };
        let msg = err.to_string();
        assert!(msg.contains("5400"));
        assert!(msg.contains("depletion persisted"));
    }
}
