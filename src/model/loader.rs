use super::Procedure;
use crate::error::GenError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The whole specification database, loaded once per run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecDatabase {
    pub procedures: Vec<Procedure>,
}

impl SpecDatabase {
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let database = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), procedures = database.procedures.len(), "loaded specification database");
        Ok(database)
    }

    pub fn from_json(text: &str) -> Result<Self, GenError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn procedure(&self, name: &str) -> Result<&Procedure, GenError> {
        let wanted = name.to_lowercase();
        self.procedures
            .iter()
            .find(|procedure| procedure.name == wanted || procedure.suffix() == wanted)
            .ok_or_else(|| GenError::UnknownProcedure(name.to_string()))
    }
}
