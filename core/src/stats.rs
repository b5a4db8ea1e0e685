//! Cross-section statistics and loop closure.
//!
//! Pure functions over a point list. Statistics are always recomputed from
//! scratch; no state is carried between calls.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CLOSURE_EPSILON_M;
use crate::leveling::rise_fall;
use crate::models::SurveyPoint;

/// Derived statistics for a survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStats {
    /// Chainage span, max - min over all points
    pub width: f64,
    /// Deepest water depth recorded
    pub max_depth: f64,
    /// Mean water depth across all points
    pub avg_depth: f64,
    pub start_elevation: Option<f64>,
    pub end_elevation: Option<f64>,
    /// Closure error, `None` for an open traverse
    pub misclose: Option<f64>,
    /// Sum of every rise between consecutive points
    pub total_rise: f64,
    /// Sum of every fall between consecutive points
    pub total_fall: f64,
    pub point_count: u32,
}

impl SurveyStats {
    /// Compute statistics with the default closed-traverse epsilon.
    pub fn compute(points: &[SurveyPoint]) -> Self {
        Self::compute_with(points, DEFAULT_CLOSURE_EPSILON_M)
    }

    pub fn compute_with(points: &[SurveyPoint], closure_epsilon: f64) -> Self {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self::default();
        };

        let mut min_distance = f64::INFINITY;
        let mut max_distance = f64::NEG_INFINITY;
        let mut max_depth = f64::NEG_INFINITY;
        let mut depth_sum: f64 = 0.0;

        for point in points {
            min_distance = min_distance.min(point.distance);
            max_distance = max_distance.max(point.distance);
            max_depth = max_depth.max(point.depth);
            depth_sum += point.depth;
        }

        let mut total_rise: f64 = 0.0;
        let mut total_fall: f64 = 0.0;
        for pair in points.windows(2) {
            let rf = rise_fall(pair[1].elevation, Some(pair[0].elevation));
            total_rise += rf.rise.unwrap_or(0.0);
            total_fall += rf.fall.unwrap_or(0.0);
        }

        SurveyStats {
            width: max_distance - min_distance,
            max_depth,
            avg_depth: depth_sum / points.len() as f64,
            start_elevation: Some(first.elevation),
            end_elevation: Some(last.elevation),
            misclose: misclose_with(points, closure_epsilon),
            total_rise,
            total_fall,
            point_count: u32::try_from(points.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Misclose with the default closed-traverse epsilon.
pub fn misclose(points: &[SurveyPoint]) -> Option<f64> {
    misclose_with(points, DEFAULT_CLOSURE_EPSILON_M)
}

/// Closure error of a loop traverse.
///
/// The traverse counts as closed when the first and last chainages differ by
/// less than `closure_epsilon`. Open traverses and lists shorter than two
/// points have no misclose.
pub fn misclose_with(points: &[SurveyPoint], closure_epsilon: f64) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?;
    let last = points.last()?;

    if (first.distance - last.distance).abs() < closure_epsilon {
        Some((first.elevation - last.elevation).abs())
    } else {
        None
    }
}

/// An open traverse is vacuously acceptable.
pub fn is_misclose_acceptable(misclose: Option<f64>, tolerance: f64) -> bool {
    match misclose {
        Some(m) => m <= tolerance,
        None => true,
    }
}

/// Closure outcome used to decide how a survey may be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum ClosureStatus {
    Open,
    ClosedOk,
    /// Misclose over tolerance; saving needs an explicit override
    ClosedWarning,
}

impl ClosureStatus {
    pub fn evaluate(misclose: Option<f64>, tolerance: f64) -> Self {
        match misclose {
            None => ClosureStatus::Open,
            Some(_) if is_misclose_acceptable(misclose, tolerance) => ClosureStatus::ClosedOk,
            Some(_) => ClosureStatus::ClosedWarning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClosureStatus::Open => "Open",
            ClosureStatus::ClosedOk => "Closed",
            ClosureStatus::ClosedWarning => "Misclose Warning",
        }
    }
}
