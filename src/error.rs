/// Generator errors
///
/// Everything that can stop a generation run ends up here. Lookup failures and
/// unrecognized shapes are build breaks for whoever curates the tables; the rest
/// is file and parsing plumbing.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("{procedure}: no size formula for parameter {parameter}")]
    MissingSize { procedure: String, parameter: String },

    #[error("{procedure}: parameter {parameter} has type {type_tag} with no entry in the width table")]
    MissingWidth { procedure: String, parameter: String, type_tag: String },

    #[error("{procedure}: parameter {parameter} has no wide target descriptor")]
    MissingWideDescriptor { procedure: String, parameter: String },

    #[error("{procedure}: no handle mapping for parameter {parameter}")]
    MissingHandle { procedure: String, parameter: String },

    #[error("{procedure}: no C type for return kind {type_tag}")]
    MissingReturnType { procedure: String, type_tag: String },

    #[error("{procedure}: parameter {parameter} (referenced by {referenced_by}) does not exist")]
    MissingParameter { procedure: String, parameter: String, referenced_by: String },

    #[error("{procedure}: parameter {parameter} has unrecognized shape {descriptor}")]
    UnrecognizedShape { procedure: String, parameter: String, descriptor: String },

    #[error("duplicate key {key} in {table}")]
    DuplicateKey { table: &'static str, key: String },

    #[error("bad size formula for {key}: {formula:?}")]
    BadFormula { key: String, formula: String },

    #[error("unknown procedure {0}")]
    UnknownProcedure(String),

    /// Size evaluation was asked about a value the sample arguments do not carry.
    #[error("no sample value for {0}")]
    MissingSample(String),

    #[error("{procedure}: size of {parameter} overflows")]
    SizeOverflow { procedure: String, parameter: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse specification database: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse platform configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GenError {
    /// True for the "a curated table has no entry" family of errors.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            GenError::MissingSize { .. }
                | GenError::MissingWidth { .. }
                | GenError::MissingWideDescriptor { .. }
                | GenError::MissingHandle { .. }
                | GenError::MissingReturnType { .. }
                | GenError::MissingParameter { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io { path: path.into(), source }
    }

    pub(crate) fn shape(procedure: &str, parameter: &str, descriptor: impl Into<String>) -> Self {
        GenError::UnrecognizedShape {
            procedure: procedure.to_string(),
            parameter: parameter.to_string(),
            descriptor: descriptor.into(),
        }
    }
}
