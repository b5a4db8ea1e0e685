pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod instrument;
pub mod leveling;
pub mod models;
pub mod reading;
pub mod stats;
pub mod store;
pub mod survey;
pub mod validation;

uniffi::setup_scaffolding!();

pub use config::SurveyConfig;
pub use error::SurveyError;
pub use models::{
    ChangePoint, FinalizeRequest, FinalizedSurvey, Geotag, PointType, RiseFall, Survey,
    SurveyPoint,
};
pub use reading::{PointReading, RawReading};
pub use stats::{ClosureStatus, SurveyStats};
pub use store::{MemoryStore, SurveyStore};
pub use survey::{PointPreview, SurveyState};
pub use validation::{validate_point, ValidationReport};
