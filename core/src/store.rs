use crate::error::SurveyError;
use crate::models::FinalizedSurvey;

impl FinalizedSurvey {
    pub fn to_json(&self) -> Result<String, SurveyError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SurveyError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Persistence collaborator for finalized surveys.
///
/// Encryption and on-device storage live behind this trait in the host app.
pub trait SurveyStore {
    fn upsert_survey(&mut self, survey: FinalizedSurvey) -> Result<(), String>;
    fn list_surveys(&self) -> Result<Vec<FinalizedSurvey>, String>;
    fn load_survey(&self, id: &str) -> Result<Option<FinalizedSurvey>, String>;
    fn delete_survey(&mut self, id: &str) -> Result<bool, String>;
}

/// In-memory store holding each survey as its serialized record.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SurveyStore for MemoryStore {
    fn upsert_survey(&mut self, survey: FinalizedSurvey) -> Result<(), String> {
        let json = survey.to_json().map_err(|e| e.to_string())?;
        let id = survey.survey.id;
        match self.records.iter().position(|(key, _)| *key == id) {
            Some(i) => self.records[i].1 = json,
            None => self.records.push((id, json)),
        }
        Ok(())
    }

    fn list_surveys(&self) -> Result<Vec<FinalizedSurvey>, String> {
        self.records
            .iter()
            .map(|(_, json)| FinalizedSurvey::from_json(json).map_err(|e| e.to_string()))
            .collect()
    }

    fn load_survey(&self, id: &str) -> Result<Option<FinalizedSurvey>, String> {
        self.records
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, json)| FinalizedSurvey::from_json(json).map_err(|e| e.to_string()))
            .transpose()
    }

    fn delete_survey(&mut self, id: &str) -> Result<bool, String> {
        let before = self.records.len();
        self.records.retain(|(key, _)| key != id);
        Ok(self.records.len() != before)
    }
}
