//! Error types for design-day simulation.

use hp_tanks::TankError;
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Tank(#[from] TankError),
}
