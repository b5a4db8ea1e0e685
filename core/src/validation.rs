//! Entry checks applied to a raw reading before it can become a point.
//!
//! Every rule runs; errors come back in rule order so the form can show them
//! all at once.

use serde::{Deserialize, Serialize};

use crate::error::SurveyError;
use crate::reading::{parse_field, Field, PointReading, RawReading};

pub const CHAIN_INVALID: &str = "Chain must be a positive number";
pub const INSTRUMENT_HEIGHT_MISSING: &str = "Set the instrument height before adding points";
pub const BACKSIGHT_INVALID: &str = "Backsight must be a number";
pub const FORESIGHT_INVALID: &str = "Foresight must be a number";
pub const SIGHTING_MISSING: &str = "Enter a backsight or foresight reading";
pub const CHANGE_POINT_SIGHTINGS: &str =
    "Change points require both backsight and foresight readings";
pub const DEPTH_INVALID: &str = "Depth must be a number";
pub const DEPTH_NEGATIVE: &str = "Depth cannot be negative";

/// Outcome of validating one raw reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Present exactly when `is_valid`
    pub reading: Option<PointReading>,
}

impl ValidationReport {
    pub fn into_result(self) -> Result<PointReading, SurveyError> {
        match self.reading {
            Some(reading) if self.is_valid => Ok(reading),
            _ => Err(SurveyError::Validation {
                errors: self.errors,
            }),
        }
    }
}

/// Validate a raw reading against the instrument height currently in effect.
pub fn validate_point(raw: &RawReading, instrument_height: Option<f64>) -> ValidationReport {
    let mut errors = Vec::new();

    let distance = match parse_field(Some(raw.distance.as_str())) {
        Field::Number(d) if d >= 0.0 => Some(d),
        _ => {
            errors.push(CHAIN_INVALID.to_string());
            None
        }
    };

    if instrument_height.is_none() {
        errors.push(INSTRUMENT_HEIGHT_MISSING.to_string());
    }

    let backsight = parse_field(raw.backsight.as_deref());
    if backsight == Field::Invalid {
        errors.push(BACKSIGHT_INVALID.to_string());
    }
    let foresight = parse_field(raw.foresight.as_deref());
    if foresight == Field::Invalid {
        errors.push(FORESIGHT_INVALID.to_string());
    }
    let (backsight, foresight) = (backsight.number(), foresight.number());

    if backsight.is_none() && foresight.is_none() {
        errors.push(SIGHTING_MISSING.to_string());
    }

    if raw.point_type.is_change_point() && (backsight.is_none() || foresight.is_none()) {
        errors.push(CHANGE_POINT_SIGHTINGS.to_string());
    }

    let depth = match parse_field(raw.depth.as_deref()) {
        Field::Blank => Some(0.0),
        Field::Number(d) if d >= 0.0 => Some(d),
        Field::Number(_) => {
            errors.push(DEPTH_NEGATIVE.to_string());
            None
        }
        Field::Invalid => {
            errors.push(DEPTH_INVALID.to_string());
            None
        }
    };

    let reading = match (errors.is_empty(), distance, depth) {
        (true, Some(distance), Some(depth)) => Some(PointReading {
            distance,
            backsight,
            foresight,
            depth,
            comment: raw.comment.trim().to_string(),
            point_type: raw.point_type,
            geotag: raw.geotag.clone(),
        }),
        _ => None,
    };

    ValidationReport {
        is_valid: reading.is_some(),
        errors,
        reading,
    }
}
