//! Chainage from GPS fixes.

use crate::models::Survey;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) distance in meters between two fixes given in
/// decimal degrees.
pub fn horizontal_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Chainage of a new fix measured from the first point's fix.
///
/// `None` when the survey has no points or its first point carries no fix.
pub fn chainage_from_start(survey: &Survey, latitude: f64, longitude: f64) -> Option<f64> {
    let start = survey.points.first()?.geotag.as_ref()?;
    Some(horizontal_distance(
        start.latitude,
        start.longitude,
        latitude,
        longitude,
    ))
}
