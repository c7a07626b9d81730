//! Sizing outputs shared by all tank components.

use serde::{Deserialize, Serialize};

/// Which physical component a result or trace row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Primary,
    Swing,
    ParallelLoop,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Component::Primary => "primary",
            Component::Swing => "swing",
            Component::ParallelLoop => "parallel loop",
        };
        f.write_str(name)
    }
}

/// One point on a volume/capacity trade-off curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub volume_gal: f64,
    pub capacity_kbtu_hr: f64,
    /// Compressor heating window that produced this point, where the curve
    /// is parameterized by one.
    pub heat_hours: Option<f64>,
}

/// Recommended size for one component, with the curve it was chosen from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub component: Component,
    pub volume_gal: f64,
    pub capacity_kbtu_hr: f64,
    /// Trade-off curve, empty for closed-form components.
    pub curve: Vec<CurvePoint>,
    /// Index of the recommended point within `curve`, when present.
    pub recommended_index: Option<usize>,
    pub feasible: bool,
    /// Human-readable caveats attached during sizing.
    pub notes: Vec<String>,
}

impl SizingResult {
    pub fn closed_form(component: Component, volume_gal: f64, capacity_kbtu_hr: f64) -> Self {
        Self {
            component,
            volume_gal,
            capacity_kbtu_hr,
            curve: Vec::new(),
            recommended_index: None,
            feasible: true,
            notes: Vec::new(),
        }
    }
}
