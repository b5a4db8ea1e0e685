use thiserror::Error;

/// Error type for point entry, leveling reduction and survey finalization.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
pub enum SurveyError {
    #[error("validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("no instrument height set")]
    NoInstrumentHeight,

    #[error("no backsight or foresight provided")]
    NoSightingProvided,

    #[error("misclose {misclose:.4} m exceeds tolerance {tolerance:.4} m")]
    MiscloseExceeded { misclose: f64, tolerance: f64 },

    #[error("invalid instrument height: {value}")]
    InvalidInstrumentHeight { value: f64 },

    #[error("invalid misclose tolerance: {value}")]
    InvalidTolerance { value: f64 },

    #[error("invalid closure epsilon: {value}")]
    InvalidClosureEpsilon { value: f64 },

    #[error("point index {index} out of range for {len} points")]
    PointIndexOutOfRange { index: u32, len: u32 },

    #[error("point {index}: change points cannot be edited in place")]
    ChangePointEdit { index: u32 },

    #[error("survey id is required")]
    MissingSurveyId,

    #[error("at least {required} survey points are required, got {actual}")]
    InsufficientPoints { required: u32, actual: u32 },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for SurveyError {
    fn from(err: serde_json::Error) -> Self {
        SurveyError::Serialization {
            reason: err.to_string(),
        }
    }
}
