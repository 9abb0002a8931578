//! Error types for appindex

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// appindex errors
///
/// Only bootstrap- and serialization-level failures surface here; per-item
/// extraction failures are absorbed inside the walker and resolver.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short variant name, used as the `type` field of the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ManifestParse(_) => "ManifestParse",
            Error::Bootstrap(_) => "Bootstrap",
            Error::Io(_) => "Io",
            Error::Yaml(_) => "Yaml",
            Error::Json(_) => "Json",
            Error::Other(_) => "Other",
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
