//! Raw field entries and their typed counterparts.
//!
//! Readings arrive from the entry form as text. Nothing downstream does
//! arithmetic on text: every numeric field is parsed here first and the
//! validator turns a [`RawReading`] into a [`PointReading`].

use nom::{
    character::complete::multispace0, combinator::all_consuming, number::complete::double,
    sequence::delimited, IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::models::{Geotag, PointType};

/// A reading as typed into the field form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    pub distance: String,
    pub backsight: Option<String>,
    pub foresight: Option<String>,
    pub depth: Option<String>,
    pub comment: String,
    pub point_type: PointType,
    pub geotag: Option<Geotag>,
}

/// A reading whose numeric fields have all been parsed and checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PointReading {
    pub distance: f64,
    pub backsight: Option<f64>,
    pub foresight: Option<f64>,
    pub depth: f64,
    pub comment: String,
    pub point_type: PointType,
    pub geotag: Option<Geotag>,
}

impl PointReading {
    /// Sightings to keep on the stored point.
    ///
    /// A change point keeps both. Any other point keeps only the sighting its
    /// elevation was reduced from, and backsight wins when both were entered.
    pub fn retained_sightings(&self) -> (Option<f64>, Option<f64>) {
        if self.point_type.is_change_point() {
            return (self.backsight, self.foresight);
        }
        match self.backsight {
            Some(bs) => (Some(bs), None),
            None => (None, self.foresight),
        }
    }
}

/// State of a single optional numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Blank,
    Number(f64),
    Invalid,
}

impl Field {
    pub fn number(self) -> Option<f64> {
        match self {
            Field::Number(v) => Some(v),
            Field::Blank | Field::Invalid => None,
        }
    }
}

/// Parse one form field. Empty or whitespace-only text is [`Field::Blank`];
/// anything that is not a single finite number is [`Field::Invalid`].
pub fn parse_field(input: Option<&str>) -> Field {
    let Some(text) = input else {
        return Field::Blank;
    };
    if text.trim().is_empty() {
        return Field::Blank;
    }
    match number(text) {
        Ok((_, value)) if value.is_finite() => Field::Number(value),
        _ => Field::Invalid,
    }
}

fn number(input: &str) -> IResult<&str, f64> {
    all_consuming(delimited(multispace0, double, multispace0)).parse(input)
}
