//! Tunable constants for traverse reduction.

use serde::{Deserialize, Serialize};

/// Start/end chainage difference (m) below which a traverse counts as closed.
pub const DEFAULT_CLOSURE_EPSILON_M: f64 = 0.1;

/// Default acceptable misclose (m), i.e. 10 mm.
pub const DEFAULT_MISCLOSE_TOLERANCE_M: f64 = 0.010;

/// Minimum number of points a survey needs before it can be saved.
pub const DEFAULT_MIN_POINTS_TO_FINALIZE: u32 = 2;

/// Parameters seeded into a new survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct SurveyConfig {
    /// Closed-traverse heuristic: |first chainage - last chainage| must be below this
    pub closure_epsilon_m: f64,
    /// Misclose at or below this is acceptable
    pub misclose_tolerance_m: f64,
    pub min_points_to_finalize: u32,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            closure_epsilon_m: DEFAULT_CLOSURE_EPSILON_M,
            misclose_tolerance_m: DEFAULT_MISCLOSE_TOLERANCE_M,
            min_points_to_finalize: DEFAULT_MIN_POINTS_TO_FINALIZE,
        }
    }
}

/// Convert a tolerance entered in millimetres to metres.
pub fn tolerance_from_mm(millimetres: f64) -> f64 {
    millimetres / 1000.0
}
