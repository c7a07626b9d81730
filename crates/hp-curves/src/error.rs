//! Error types for performance-table lookups.

use thiserror::Error;

pub type CurveResult<T> = Result<T, CurveError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error(
        "Conditions outside the tabulated domain: {axis} = {value} (table covers {min} to {max})"
    )]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Demand standard not tabulated: {what}")]
    UnsupportedStandard { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
