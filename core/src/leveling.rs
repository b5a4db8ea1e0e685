//! Height-of-instrument reduction.
//!
//! Pure functions: elevation from a sighting, rise/fall between consecutive
//! points, and reduction of a validated reading into a [`SurveyPoint`].

use crate::error::SurveyError;
use crate::models::{RiseFall, SurveyPoint};
use crate::reading::PointReading;

/// Elevation of a staff reading.
///
/// A backsight adds to the instrument height, a foresight subtracts from it.
/// When both are given the backsight is used.
pub fn resolve_elevation(
    instrument_height: Option<f64>,
    backsight: Option<f64>,
    foresight: Option<f64>,
) -> Result<f64, SurveyError> {
    let ih = instrument_height.ok_or(SurveyError::NoInstrumentHeight)?;

    if let Some(bs) = backsight.filter(|v| !v.is_nan()) {
        return Ok(ih + bs);
    }
    if let Some(fs) = foresight.filter(|v| !v.is_nan()) {
        return Ok(ih - fs);
    }
    Err(SurveyError::NoSightingProvided)
}

/// Rise or fall from `previous` to `current`.
///
/// Zero is tested with exact equality: a level step reports `0.0` for both
/// rise and fall, which is distinct from the all-`None` first point.
pub fn rise_fall(current: f64, previous: Option<f64>) -> RiseFall {
    let Some(previous) = previous else {
        return RiseFall::default();
    };

    let difference = current - previous;
    if difference > 0.0 {
        RiseFall {
            rise: Some(difference),
            fall: None,
            difference: Some(difference),
        }
    } else if difference < 0.0 {
        RiseFall {
            rise: None,
            fall: Some(difference.abs()),
            difference: Some(difference),
        }
    } else {
        RiseFall {
            rise: Some(0.0),
            fall: Some(0.0),
            difference: Some(0.0),
        }
    }
}

pub fn water_level(elevation: f64, depth: f64) -> f64 {
    elevation - depth
}

/// Reduce a validated reading to a point using the instrument height in effect.
pub fn reduce_reading(
    reading: &PointReading,
    instrument_height: f64,
    previous_elevation: Option<f64>,
) -> Result<SurveyPoint, SurveyError> {
    let elevation = resolve_elevation(
        Some(instrument_height),
        reading.backsight,
        reading.foresight,
    )?;
    let (backsight, foresight) = reading.retained_sightings();

    let mut point = SurveyPoint {
        distance: reading.distance,
        elevation,
        backsight,
        foresight,
        depth: reading.depth,
        water_level: water_level(elevation, reading.depth),
        point_type: reading.point_type,
        rise: None,
        fall: None,
        difference: None,
        instrument_height,
        comment: reading.comment.clone(),
        geotag: reading.geotag.clone(),
    };
    point.set_rise_fall(rise_fall(elevation, previous_elevation));
    Ok(point)
}
