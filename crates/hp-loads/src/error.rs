//! Error types for demand construction.

use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error(
        "Implausible hot water demand: {gpdpp} gal/day/person (expected 0 < gpdpp <= {max_gpdpp})"
    )]
    InvalidDemand { gpdpp: f64, max_gpdpp: f64 },

    #[error("Load shape must sum to 1.0 within {tolerance}, got {sum}")]
    InvalidShape { sum: f64, tolerance: f64 },

    #[error("Load shape entry {index} is negative: {value}")]
    NegativeShapeEntry { index: usize, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_offending_value() {
        let err = LoadError::InvalidDemand {
            gpdpp: 200.0,
            max_gpdpp: 49.0,
        };
        assert!(err.to_string().contains("200"));
    }
}
