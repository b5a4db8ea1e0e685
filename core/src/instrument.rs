//! Instrument height tracking and change-point handling.

use crate::error::SurveyError;
use crate::models::{ChangePoint, Survey, SurveyPoint};
use crate::validation::CHANGE_POINT_SIGHTINGS;

/// Instrument height for the next reading: the latest change point's new
/// height, or the survey's initial height if there are no change points.
pub fn current_instrument_height(survey: &Survey) -> Option<f64> {
    survey
        .change_points
        .last()
        .map(|cp| cp.new_instrument_height)
        .or(survey.instrument_height)
}

/// Instrument height after relocating onto a change point.
pub fn new_instrument_height(point_elevation: f64, backsight: f64) -> f64 {
    point_elevation + backsight
}

/// Build the change point record for a reduced point about to be appended at
/// `point_index`.
///
/// The point's foresight closes the old setup; its backsight opens the new
/// one. The point itself must already carry the old instrument height.
pub fn change_point_for(point_index: u32, point: &SurveyPoint) -> Result<ChangePoint, SurveyError> {
    let (Some(backsight), Some(foresight)) = (point.backsight, point.foresight) else {
        return Err(SurveyError::Validation {
            errors: vec![CHANGE_POINT_SIGHTINGS.to_string()],
        });
    };

    Ok(ChangePoint {
        point_index,
        elevation: point.elevation,
        distance: point.distance,
        comment: point.comment.clone(),
        backsight,
        foresight,
        old_instrument_height: point.instrument_height,
        new_instrument_height: new_instrument_height(point.elevation, backsight),
    })
}
