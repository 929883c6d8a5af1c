use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an extraction run
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while scanning the dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schema YAML: {0}")]
    Schema(#[from] serde_yaml::Error),

    #[error("schema has no part-of-speech table for edition `{0}`")]
    MissingEdition(String),

    #[error("invalid language code `{code}` at line {line} of {path:?}")]
    LanguageCode {
        path: PathBuf,
        line: usize,
        code: String,
    },

    #[error("language code list {0:?} is empty")]
    EmptyLanguageCodes(PathBuf),

    #[error("failed to build marker pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
