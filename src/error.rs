use thiserror::Error;

use crate::types::EntityKind;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Remote source unavailable at {url}: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error("No {kind} found with id '{id}'")]
    NotFound { kind: EntityKind, id: String },

    #[error("Malformed response for {context}: {detail}")]
    MalformedResponse { context: String, detail: String },

    #[error("Sequence '{sequence}' has {actual} entries, expected {expected}")]
    Alignment {
        sequence: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub fn malformed(context: impl Into<String>, detail: impl Into<String>) -> Self {
        EtlError::MalformedResponse {
            context: context.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
