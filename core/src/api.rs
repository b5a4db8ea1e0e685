//! Functions exported to the mobile shell through uniffi.
//!
//! Records cross the boundary by value, so every survey update takes the
//! current survey and hands back the new one.

use crate::config::{self, SurveyConfig};
use crate::error::SurveyError;
use crate::geo;
use crate::instrument;
use crate::leveling;
use crate::models::{FinalizeRequest, FinalizedSurvey, PointType, RiseFall, Survey, SurveyPoint};
use crate::reading::RawReading;
use crate::stats::{self, ClosureStatus, SurveyStats};
use crate::survey::{PointPreview, SurveyState};
use crate::validation::{self, ValidationReport};

#[uniffi::export]
pub fn default_survey_config() -> SurveyConfig {
    SurveyConfig::default()
}

#[uniffi::export]
pub fn new_survey(id: String, config: SurveyConfig) -> Survey {
    Survey::with_config(id, &config)
}

#[uniffi::export]
pub fn set_survey_id(survey: Survey, id: String) -> Survey {
    survey.with_id(id)
}

#[uniffi::export]
pub fn set_survey_notes(survey: Survey, notes: String) -> Survey {
    survey.with_notes(notes)
}

#[uniffi::export]
pub fn set_instrument_height(survey: Survey, height: f64) -> Result<Survey, SurveyError> {
    survey.with_instrument_height(height)
}

#[uniffi::export]
pub fn set_misclose_tolerance(survey: Survey, tolerance_m: f64) -> Result<Survey, SurveyError> {
    survey.with_misclose_tolerance(tolerance_m)
}

#[uniffi::export]
pub fn set_misclose_tolerance_mm(
    survey: Survey,
    tolerance_mm: f64,
) -> Result<Survey, SurveyError> {
    survey.with_misclose_tolerance(config::tolerance_from_mm(tolerance_mm))
}

#[uniffi::export]
pub fn set_closure_epsilon(survey: Survey, epsilon_m: f64) -> Result<Survey, SurveyError> {
    survey.with_closure_epsilon(epsilon_m)
}

#[uniffi::export]
pub fn validate_reading(reading: RawReading, instrument_height: Option<f64>) -> ValidationReport {
    validation::validate_point(&reading, instrument_height)
}

#[uniffi::export]
pub fn preview_point(survey: Survey, reading: RawReading) -> Result<PointPreview, SurveyError> {
    survey.preview_point(&reading)
}

#[uniffi::export]
pub fn add_point(survey: Survey, reading: RawReading) -> Result<Survey, SurveyError> {
    survey.add_point(&reading)
}

#[uniffi::export]
pub fn remove_last_point(survey: Survey) -> Survey {
    survey.remove_last_point()
}

#[uniffi::export]
pub fn remove_point(survey: Survey, index: u32) -> Result<Survey, SurveyError> {
    survey.remove_point(index)
}

#[uniffi::export]
pub fn replace_point(
    survey: Survey,
    index: u32,
    reading: RawReading,
) -> Result<Survey, SurveyError> {
    survey.replace_point(index, &reading)
}

#[uniffi::export]
pub fn current_instrument_height(survey: Survey) -> Option<f64> {
    instrument::current_instrument_height(&survey)
}

#[uniffi::export]
pub fn survey_state(survey: Survey) -> SurveyState {
    survey.state()
}

#[uniffi::export]
pub fn suggested_point_type(survey: Survey) -> PointType {
    survey.suggested_point_type()
}

#[uniffi::export]
pub fn closure_status(survey: Survey) -> ClosureStatus {
    survey.closure_status()
}

#[uniffi::export]
pub fn finalize_survey(
    survey: Survey,
    request: FinalizeRequest,
) -> Result<FinalizedSurvey, SurveyError> {
    survey.finalize(request)
}

#[uniffi::export]
pub fn finalized_survey_to_json(survey: FinalizedSurvey) -> Result<String, SurveyError> {
    survey.to_json()
}

#[uniffi::export]
pub fn finalized_survey_from_json(json: String) -> Result<FinalizedSurvey, SurveyError> {
    FinalizedSurvey::from_json(&json)
}

#[uniffi::export]
pub fn resolve_elevation(
    instrument_height: Option<f64>,
    backsight: Option<f64>,
    foresight: Option<f64>,
) -> Result<f64, SurveyError> {
    leveling::resolve_elevation(instrument_height, backsight, foresight)
}

#[uniffi::export]
pub fn compute_rise_fall(current: f64, previous: Option<f64>) -> RiseFall {
    leveling::rise_fall(current, previous)
}

#[uniffi::export]
pub fn compute_survey_stats(points: Vec<SurveyPoint>, closure_epsilon: f64) -> SurveyStats {
    SurveyStats::compute_with(&points, closure_epsilon)
}

#[uniffi::export]
pub fn compute_misclose(points: Vec<SurveyPoint>, closure_epsilon: f64) -> Option<f64> {
    stats::misclose_with(&points, closure_epsilon)
}

#[uniffi::export]
pub fn is_misclose_acceptable(misclose: Option<f64>, tolerance: f64) -> bool {
    stats::is_misclose_acceptable(misclose, tolerance)
}

#[uniffi::export]
pub fn horizontal_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    geo::horizontal_distance(lat1, lon1, lat2, lon2)
}

#[uniffi::export]
pub fn chainage_from_start(survey: Survey, latitude: f64, longitude: f64) -> Option<f64> {
    geo::chainage_from_start(&survey, latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(distance: &str, bs: Option<&str>, fs: Option<&str>) -> RawReading {
        RawReading {
            distance: distance.to_string(),
            backsight: bs.map(str::to_string),
            foresight: fs.map(str::to_string),
            depth: Some("0.4".to_string()),
            comment: String::new(),
            point_type: PointType::Intermediate,
            geotag: None,
        }
    }

    #[test]
    fn test_by_value_session() {
        let survey = new_survey("XS-010".to_string(), default_survey_config());
        assert_eq!(survey_state(survey.clone()), SurveyState::Unset);

        let survey = set_instrument_height(survey, 1.65).unwrap();
        let survey = set_misclose_tolerance_mm(survey, 5.0).unwrap();
        assert!((survey.misclose_tolerance - 0.005).abs() < 1e-12);

        let survey = add_point(survey, raw("0", Some("0.35"), None)).unwrap();
        let survey = add_point(survey, raw("6.5", None, Some("1.1"))).unwrap();
        assert_eq!(survey.points.len(), 2);
        assert!((survey.points[1].water_level - 0.15).abs() < 1e-9);
        assert_eq!(closure_status(survey.clone()), ClosureStatus::Open);

        let stats = compute_survey_stats(survey.points.clone(), survey.closure_epsilon);
        assert_eq!(stats, survey.stats);
    }

    #[test]
    fn test_validate_reading_export() {
        let report = validate_reading(raw("", None, None), Some(1.5));
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
    }
}
