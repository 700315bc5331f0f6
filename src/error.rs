//! Error handling for the DataPipes application
//!
//! This module defines the application-level error type and a Result alias.
//! Engine failures are carried as `PipelineError` inside `DataPipesError::Pipeline`.

use crate::pipeline::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for DataPipes operations
#[derive(Error, Debug)]
pub enum DataPipesError {
    /// The configuration file does not exist
    #[error("\"{}\" is not a file. Please check that the file exists.", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration is malformed or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised while building or executing a pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DataPipesError>,
    },
}

impl DataPipesError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DataPipesError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error stems from the configuration rather than from running it
    pub fn is_config_error(&self) -> bool {
        match self {
            DataPipesError::ConfigNotFound(_)
            | DataPipesError::Config(_)
            | DataPipesError::Yaml(_) => true,
            DataPipesError::Pipeline(err) => err.is_config_error(),
            DataPipesError::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

/// Result type alias for DataPipes operations
pub type Result<T> = std::result::Result<T, DataPipesError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
