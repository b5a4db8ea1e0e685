use serde::{Deserialize, Serialize};

use crate::stats::{ClosureStatus, SurveyStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    Backsight,
    Intermediate,
    Foresight,
    #[serde(rename = "changepoint")]
    ChangePoint,
    Benchmark,
    Normal,
}

impl PointType {
    pub fn label(&self) -> &'static str {
        match self {
            PointType::Backsight => "backsight",
            PointType::Intermediate => "intermediate",
            PointType::Foresight => "foresight",
            PointType::ChangePoint => "changepoint",
            PointType::Benchmark => "benchmark",
            PointType::Normal => "normal",
        }
    }

    pub fn is_change_point(&self) -> bool {
        matches!(self, PointType::ChangePoint)
    }
}

/// Signed elevation change between consecutive points.
///
/// All three fields are `None` for the first point. A level step is
/// `rise = fall = difference = Some(0.0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct RiseFall {
    pub rise: Option<f64>,
    pub fall: Option<f64>,
    pub difference: Option<f64>,
}

/// One recorded station along the transect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPoint {
    /// Chainage along the transect in meters
    pub distance: f64,
    /// Reduced level in meters
    pub elevation: f64,
    pub backsight: Option<f64>,
    pub foresight: Option<f64>,
    /// Water depth at the station in meters
    pub depth: f64,
    /// `elevation - depth`
    pub water_level: f64,
    pub point_type: PointType,
    pub rise: Option<f64>,
    pub fall: Option<f64>,
    pub difference: Option<f64>,
    /// Instrument height in effect when the reading was taken
    pub instrument_height: f64,
    pub comment: String,
    /// Where the staff stood, if the GPS collaborator supplied a fix
    pub geotag: Option<Geotag>,
}

impl SurveyPoint {
    pub fn rise_fall(&self) -> RiseFall {
        RiseFall {
            rise: self.rise,
            fall: self.fall,
            difference: self.difference,
        }
    }

    pub fn set_rise_fall(&mut self, rise_fall: RiseFall) {
        self.rise = rise_fall.rise;
        self.fall = rise_fall.fall;
        self.difference = rise_fall.difference;
    }
}

/// An instrument relocation, linked by index to the point it was taken at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ChangePoint {
    pub point_index: u32,
    pub elevation: f64,
    pub distance: f64,
    pub comment: String,
    pub backsight: f64,
    pub foresight: f64,
    pub old_instrument_height: f64,
    pub new_instrument_height: f64,
}

/// A cross-section survey under construction.
///
/// `stats` is always the full recomputation over `points`; nothing patches it
/// incrementally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub notes: String,
    /// Initial instrument height, before any change point
    pub instrument_height: Option<f64>,
    pub points: Vec<SurveyPoint>,
    pub change_points: Vec<ChangePoint>,
    pub stats: SurveyStats,
    pub misclose_tolerance: f64,
    /// Feeds `stats.misclose`; change it with `Survey::with_closure_epsilon`
    /// so the statistics are recomputed
    pub closure_epsilon: f64,
    pub min_points_to_finalize: u32,
}

/// GPS fix supplied by the location collaborator, per point or per survey.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Geotag {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    /// Replaces the survey notes when present
    pub notes: Option<String>,
    pub timestamp_unix: i64,
    pub geotag: Option<Geotag>,
    /// Persist even when the misclose exceeds tolerance
    pub override_misclose: bool,
}

/// A frozen survey record handed to storage and export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedSurvey {
    pub survey: Survey,
    pub timestamp_unix: i64,
    pub geotag: Option<Geotag>,
    pub closure: ClosureStatus,
}
