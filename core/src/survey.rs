//! The survey aggregate and its update functions.
//!
//! Every update borrows the current survey and returns a new one, so a failed
//! operation leaves the caller's survey untouched. `points` and
//! `change_points` are linked by index: a change point always refers to an
//! existing point, and removing that point removes it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SurveyConfig;
use crate::error::SurveyError;
use crate::instrument::{change_point_for, current_instrument_height};
use crate::leveling::{reduce_reading, rise_fall};
use crate::models::{FinalizeRequest, FinalizedSurvey, PointType, RiseFall, Survey};
use crate::reading::RawReading;
use crate::stats::{ClosureStatus, SurveyStats};
use crate::validation::validate_point;

/// Where a survey is in its field session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum SurveyState {
    /// No instrument height yet; point entry is blocked
    Unset,
    Ready,
    Accumulating,
}

/// What a reading would produce if it were added now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PointPreview {
    pub elevation: f64,
    pub rise_fall: RiseFall,
    pub start_elevation: Option<f64>,
    pub total_from_start: Option<f64>,
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

impl Survey {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, &SurveyConfig::default())
    }

    pub fn with_config(id: impl Into<String>, config: &SurveyConfig) -> Self {
        Survey {
            id: id.into(),
            notes: String::new(),
            instrument_height: None,
            points: Vec::new(),
            change_points: Vec::new(),
            stats: SurveyStats::default(),
            misclose_tolerance: config.misclose_tolerance_m,
            closure_epsilon: config.closure_epsilon_m,
            min_points_to_finalize: config.min_points_to_finalize,
        }
    }

    pub fn with_id(&self, id: impl Into<String>) -> Survey {
        let mut next = self.clone();
        next.id = id.into();
        next
    }

    pub fn with_notes(&self, notes: impl Into<String>) -> Survey {
        let mut next = self.clone();
        next.notes = notes.into();
        next
    }

    /// Set the initial instrument height.
    ///
    /// Points already taken keep the height they were reduced with.
    pub fn with_instrument_height(&self, height: f64) -> Result<Survey, SurveyError> {
        if !height.is_finite() || height <= 0.0 {
            return Err(SurveyError::InvalidInstrumentHeight { value: height });
        }
        let mut next = self.clone();
        next.instrument_height = Some(height);
        debug!(survey = %next.id, instrument_height = height, "instrument height set");
        Ok(next)
    }

    /// Set the acceptable misclose in meters.
    pub fn with_misclose_tolerance(&self, tolerance: f64) -> Result<Survey, SurveyError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(SurveyError::InvalidTolerance { value: tolerance });
        }
        let mut next = self.clone();
        next.misclose_tolerance = tolerance;
        Ok(next)
    }

    /// Set the closed-traverse chainage epsilon and recompute the statistics.
    pub fn with_closure_epsilon(&self, epsilon: f64) -> Result<Survey, SurveyError> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(SurveyError::InvalidClosureEpsilon { value: epsilon });
        }
        let mut next = self.clone();
        next.closure_epsilon = epsilon;
        next.recompute();
        Ok(next)
    }

    pub fn current_instrument_height(&self) -> Option<f64> {
        current_instrument_height(self)
    }

    pub fn state(&self) -> SurveyState {
        if !self.points.is_empty() {
            SurveyState::Accumulating
        } else if self.current_instrument_height().is_some() {
            SurveyState::Ready
        } else {
            SurveyState::Unset
        }
    }

    pub fn closure_status(&self) -> ClosureStatus {
        ClosureStatus::evaluate(self.stats.misclose, self.misclose_tolerance)
    }

    /// Point type the entry form should start on.
    pub fn suggested_point_type(&self) -> PointType {
        if self.points.is_empty() {
            PointType::Backsight
        } else {
            PointType::Intermediate
        }
    }

    /// Validate and reduce a reading without adding it.
    pub fn preview_point(&self, raw: &RawReading) -> Result<PointPreview, SurveyError> {
        let ih = self.current_instrument_height();
        let reading = validate_point(raw, ih).into_result()?;
        let ih = ih.ok_or(SurveyError::NoInstrumentHeight)?;
        let previous = self.points.last().map(|p| p.elevation);
        let point = reduce_reading(&reading, ih, previous)?;

        let start_elevation = self.points.first().map(|p| p.elevation);
        Ok(PointPreview {
            elevation: point.elevation,
            rise_fall: point.rise_fall(),
            start_elevation,
            total_from_start: start_elevation.map(|start| point.elevation - start),
        })
    }

    /// Append a reading to the end of the traverse.
    ///
    /// A change point also records the instrument relocation, so the next
    /// reading is reduced against the new instrument height.
    pub fn add_point(&self, raw: &RawReading) -> Result<Survey, SurveyError> {
        let ih = self.current_instrument_height();
        let reading = validate_point(raw, ih).into_result()?;
        let ih = ih.ok_or(SurveyError::NoInstrumentHeight)?;
        let previous = self.points.last().map(|p| p.elevation);
        let point = reduce_reading(&reading, ih, previous)?;

        let mut next = self.clone();
        let index = index_u32(next.points.len());
        if point.point_type.is_change_point() {
            let change_point = change_point_for(index, &point)?;
            debug!(
                survey = %next.id,
                index,
                old_instrument_height = change_point.old_instrument_height,
                new_instrument_height = change_point.new_instrument_height,
                "change point recorded"
            );
            next.change_points.push(change_point);
        }

        debug!(
            survey = %next.id,
            index,
            point_type = point.point_type.label(),
            elevation = point.elevation,
            "point added"
        );
        next.points.push(point);
        next.recompute();
        Ok(next)
    }

    /// Drop the most recent point. An empty survey is returned unchanged.
    pub fn remove_last_point(&self) -> Survey {
        match self.points.len().checked_sub(1) {
            Some(last) => self.remove_at(last),
            None => self.clone(),
        }
    }

    /// Drop the point at `index` together with any change point linked to it.
    pub fn remove_point(&self, index: u32) -> Result<Survey, SurveyError> {
        let at = self.checked_index(index)?;
        Ok(self.remove_at(at))
    }

    /// Re-enter the reading at `index`.
    ///
    /// The new reading is reduced with the instrument height the original was
    /// taken with. Only this point and the rise/fall of the point after it
    /// change. Change points cannot be edited in place.
    pub fn replace_point(&self, index: u32, raw: &RawReading) -> Result<Survey, SurveyError> {
        let at = self.checked_index(index)?;
        let existing = &self.points[at];
        if existing.point_type.is_change_point() || raw.point_type.is_change_point() {
            return Err(SurveyError::ChangePointEdit { index });
        }

        let ih = existing.instrument_height;
        let reading = validate_point(raw, Some(ih)).into_result()?;
        let previous = at.checked_sub(1).map(|i| self.points[i].elevation);
        let point = reduce_reading(&reading, ih, previous)?;

        let mut next = self.clone();
        debug!(survey = %next.id, index, elevation = point.elevation, "point replaced");
        next.points[at] = point;
        next.refresh_rise_fall(at + 1);
        next.recompute();
        Ok(next)
    }

    /// Freeze the survey for storage.
    ///
    /// A misclose over tolerance is refused unless the request overrides it.
    pub fn finalize(&self, request: FinalizeRequest) -> Result<FinalizedSurvey, SurveyError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(SurveyError::MissingSurveyId);
        }

        let actual = index_u32(self.points.len());
        if actual < self.min_points_to_finalize {
            return Err(SurveyError::InsufficientPoints {
                required: self.min_points_to_finalize,
                actual,
            });
        }

        let closure = self.closure_status();
        if closure == ClosureStatus::ClosedWarning {
            let misclose = self.stats.misclose.unwrap_or_default();
            if !request.override_misclose {
                return Err(SurveyError::MiscloseExceeded {
                    misclose,
                    tolerance: self.misclose_tolerance,
                });
            }
            warn!(survey = id, misclose, "saving survey with misclose over tolerance");
        }

        let mut survey = self.clone();
        survey.id = id.to_string();
        if let Some(notes) = request.notes {
            survey.notes = notes;
        }
        survey.notes = survey.notes.trim().to_string();

        info!(
            survey = %survey.id,
            points = survey.points.len(),
            change_points = survey.change_points.len(),
            closure = closure.label(),
            "survey finalized"
        );

        Ok(FinalizedSurvey {
            survey,
            timestamp_unix: request.timestamp_unix,
            geotag: request.geotag,
            closure,
        })
    }

    fn checked_index(&self, index: u32) -> Result<usize, SurveyError> {
        let at = index as usize;
        if at < self.points.len() {
            Ok(at)
        } else {
            Err(SurveyError::PointIndexOutOfRange {
                index,
                len: index_u32(self.points.len()),
            })
        }
    }

    fn remove_at(&self, at: usize) -> Survey {
        let mut next = self.clone();
        let removed = next.points.remove(at);
        let index = index_u32(at);

        next.change_points.retain(|cp| cp.point_index != index);
        for cp in next.change_points.iter_mut() {
            if cp.point_index > index {
                cp.point_index -= 1;
            }
        }

        debug!(
            survey = %next.id,
            index,
            point_type = removed.point_type.label(),
            "point removed"
        );
        next.refresh_rise_fall(at);
        next.recompute();
        next
    }

    /// Recompute the rise/fall of the point at `at` against its predecessor.
    fn refresh_rise_fall(&mut self, at: usize) {
        let previous = at.checked_sub(1).map(|i| self.points[i].elevation);
        if let Some(point) = self.points.get_mut(at) {
            let rf = rise_fall(point.elevation, previous);
            point.set_rise_fall(rf);
        }
    }

    fn recompute(&mut self) {
        self.stats = SurveyStats::compute_with(&self.points, self.closure_epsilon);
        if let Some(misclose) = self.stats.misclose {
            if misclose > self.misclose_tolerance {
                warn!(
                    survey = %self.id,
                    misclose,
                    tolerance = self.misclose_tolerance,
                    "misclose exceeds tolerance"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn reading(
        distance: &str,
        bs: Option<&str>,
        fs: Option<&str>,
        point_type: PointType,
    ) -> RawReading {
        RawReading {
            distance: distance.to_string(),
            backsight: bs.map(str::to_string),
            foresight: fs.map(str::to_string),
            depth: None,
            comment: String::new(),
            point_type,
            geotag: None,
        }
    }

    fn change_point_survey() -> Survey {
        Survey::new("XS-001")
            .with_instrument_height(1.5)
            .unwrap()
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap()
            .add_point(&reading("8", Some("1.2"), Some("0.3"), PointType::ChangePoint))
            .unwrap()
            .add_point(&reading("12", None, Some("1.4"), PointType::Intermediate))
            .unwrap()
    }

    fn request(override_misclose: bool) -> FinalizeRequest {
        FinalizeRequest {
            notes: None,
            timestamp_unix: 1_760_000_000,
            geotag: None,
            override_misclose,
        }
    }

    #[test]
    fn test_state_transitions() {
        let survey = Survey::new("XS-001");
        assert_eq!(survey.state(), SurveyState::Unset);

        let survey = survey.with_instrument_height(1.5).unwrap();
        assert_eq!(survey.state(), SurveyState::Ready);

        let survey = survey
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap();
        assert_eq!(survey.state(), SurveyState::Accumulating);
    }

    #[test]
    fn test_add_point_without_instrument_height() {
        let survey = Survey::new("XS-001");
        let err = survey
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap_err();
        assert!(matches!(err, SurveyError::Validation { .. }));
        assert!(survey.points.is_empty());
    }

    #[test]
    fn test_change_point_scenario() {
        let survey = change_point_survey();

        assert_eq!(survey.points.len(), 3);
        assert!(approx(survey.points[0].elevation, 2.0));
        assert!(approx(survey.points[1].elevation, 2.7));
        assert!(approx(survey.points[2].elevation, 2.5));

        assert_eq!(survey.points[1].instrument_height, 1.5);
        assert_eq!(survey.points[1].backsight, Some(1.2));
        assert_eq!(survey.points[1].foresight, Some(0.3));
        assert!(approx(survey.points[2].instrument_height, 3.9));

        assert_eq!(survey.change_points.len(), 1);
        let cp = &survey.change_points[0];
        assert_eq!(cp.point_index, 1);
        assert_eq!(cp.old_instrument_height, 1.5);
        assert!(approx(cp.new_instrument_height, 3.9));
        assert!(approx(survey.current_instrument_height().unwrap(), 3.9));

        assert_eq!(survey.stats.start_elevation, Some(survey.points[0].elevation));
        assert_eq!(survey.stats.width, 12.0);
    }

    #[test]
    fn test_remove_change_point_reverts_height() {
        let survey = change_point_survey().remove_point(1).unwrap();

        assert_eq!(survey.points.len(), 2);
        assert!(survey.change_points.is_empty());
        assert_eq!(survey.current_instrument_height(), Some(1.5));

        // elevations are never re-reduced
        assert!(approx(survey.points[1].elevation, 2.5));
        assert!(approx(survey.points[1].difference.unwrap(), 0.5));
    }

    #[test]
    fn test_remove_point_shifts_change_point_indices() {
        let survey = change_point_survey().remove_point(0).unwrap();

        assert_eq!(survey.change_points.len(), 1);
        assert_eq!(survey.change_points[0].point_index, 0);
        assert_eq!(survey.points[0].point_type, PointType::ChangePoint);
        assert_eq!(survey.points[0].rise_fall(), RiseFall::default());
    }

    #[test]
    fn test_remove_last_point() {
        let survey = change_point_survey();
        let trimmed = survey.remove_last_point().remove_last_point();

        assert_eq!(trimmed.points.len(), 1);
        assert!(trimmed.change_points.is_empty());
        assert_eq!(trimmed.stats.point_count, 1);

        let empty = Survey::new("XS-002");
        assert_eq!(empty.remove_last_point(), empty);
    }

    #[test]
    fn test_remove_point_out_of_range() {
        let err = change_point_survey().remove_point(3).unwrap_err();
        assert_eq!(err, SurveyError::PointIndexOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_replace_point_uses_original_instrument_height() {
        let survey = change_point_survey();
        let edited = survey
            .replace_point(2, &reading("12", None, Some("1.0"), PointType::Intermediate))
            .unwrap();

        assert!(approx(edited.points[2].elevation, 2.9));
        assert!(approx(edited.points[2].rise.unwrap(), 0.2));
        assert_eq!(edited.points[0], survey.points[0]);
        assert_eq!(edited.points[1], survey.points[1]);
    }

    #[test]
    fn test_replace_point_refreshes_following_rise_fall() {
        let survey = change_point_survey();
        let edited = survey
            .replace_point(0, &reading("0", Some("1.2"), None, PointType::Backsight))
            .unwrap();

        assert!(approx(edited.points[0].elevation, 2.7));
        assert_eq!(edited.points[1].difference, Some(0.0));
        assert_eq!(edited.points[1].elevation, survey.points[1].elevation);
    }

    #[test]
    fn test_replace_change_point_rejected() {
        let survey = change_point_survey();
        let err = survey
            .replace_point(1, &reading("8", Some("1.0"), None, PointType::Intermediate))
            .unwrap_err();
        assert_eq!(err, SurveyError::ChangePointEdit { index: 1 });

        let err = survey
            .replace_point(2, &reading("12", Some("1.0"), Some("0.2"), PointType::ChangePoint))
            .unwrap_err();
        assert_eq!(err, SurveyError::ChangePointEdit { index: 2 });
    }

    #[test]
    fn test_preview_point() {
        let survey = change_point_survey();
        let preview = survey
            .preview_point(&reading("14", None, Some("1.9"), PointType::Intermediate))
            .unwrap();

        assert!(approx(preview.elevation, 2.0));
        assert!(approx(preview.rise_fall.fall.unwrap(), 0.5));
        assert!(approx(preview.total_from_start.unwrap(), 0.0));
        assert_eq!(survey.points.len(), 3);
    }

    #[test]
    fn test_setters_reject_bad_values() {
        let survey = Survey::new("XS-001");
        assert_eq!(
            survey.with_instrument_height(0.0).unwrap_err(),
            SurveyError::InvalidInstrumentHeight { value: 0.0 }
        );
        assert!(survey.with_instrument_height(f64::NAN).is_err());
        assert!(survey.with_misclose_tolerance(-0.01).is_err());
        assert_eq!(
            survey.with_misclose_tolerance(0.005).unwrap().misclose_tolerance,
            0.005
        );
    }

    #[test]
    fn test_closure_epsilon_recomputes_misclose() {
        let survey = Survey::new("XS-001")
            .with_instrument_height(1.5)
            .unwrap()
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap()
            .add_point(&reading("0.15", Some("0.52"), None, PointType::Benchmark))
            .unwrap();
        assert_eq!(survey.stats.misclose, None);
        assert_eq!(survey.closure_status(), ClosureStatus::Open);

        let widened = survey.with_closure_epsilon(0.2).unwrap();
        assert!(approx(widened.stats.misclose.unwrap(), 0.02));
        assert_eq!(widened.closure_status(), ClosureStatus::ClosedWarning);
        assert_eq!(survey.stats.misclose, None);

        assert_eq!(
            survey.with_closure_epsilon(0.0).unwrap_err(),
            SurveyError::InvalidClosureEpsilon { value: 0.0 }
        );
        assert!(survey.with_closure_epsilon(f64::INFINITY).is_err());
    }

    #[test]
    fn test_suggested_point_type() {
        let survey = Survey::new("XS-001").with_instrument_height(1.5).unwrap();
        assert_eq!(survey.suggested_point_type(), PointType::Backsight);
        let survey = survey
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap();
        assert_eq!(survey.suggested_point_type(), PointType::Intermediate);
    }

    #[test]
    fn test_finalize_preconditions() {
        let survey = Survey::new("   ").with_instrument_height(1.5).unwrap();
        assert_eq!(
            survey.finalize(request(false)).unwrap_err(),
            SurveyError::MissingSurveyId
        );

        let survey = survey
            .with_id("XS-001")
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap();
        assert_eq!(
            survey.finalize(request(false)).unwrap_err(),
            SurveyError::InsufficientPoints {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_finalize_misclose_warning_needs_override() {
        let survey = Survey::new(" XS-001 ")
            .with_notes(" left bank ")
            .with_instrument_height(1.5)
            .unwrap()
            .add_point(&reading("0", Some("0.5"), None, PointType::Backsight))
            .unwrap()
            .add_point(&reading("10", None, Some("0.2"), PointType::Intermediate))
            .unwrap()
            .add_point(&reading("0", Some("0.52"), None, PointType::Benchmark))
            .unwrap();

        assert_eq!(survey.closure_status(), ClosureStatus::ClosedWarning);
        assert!(matches!(
            survey.finalize(request(false)),
            Err(SurveyError::MiscloseExceeded { .. })
        ));

        let finalized = survey.finalize(request(true)).unwrap();
        assert_eq!(finalized.closure, ClosureStatus::ClosedWarning);
        assert_eq!(finalized.survey.id, "XS-001");
        assert_eq!(finalized.survey.notes, "left bank");
        assert_eq!(finalized.timestamp_unix, 1_760_000_000);
    }
}
