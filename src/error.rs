// Person From Vid Error Types

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PfvError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Naming error: {0}")]
    Naming(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for PfvError {
    fn from(err: anyhow::Error) -> Self {
        PfvError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PfvError>;

/// A single violated constraint, keyed by the dotted field path (e.g. `models.batch_size`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![ValidationError::new(field, message)])
    }

    /// Ok when nothing was collected, otherwise the collected violations.
    pub fn into_result(errors: Vec<ValidationError>) -> std::result::Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// True if any violation names `field` exactly.
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
