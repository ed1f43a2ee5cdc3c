use compact_str::CompactString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-specific errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Data source '{key}' is already registered")]
    #[diagnostic(
        code(appdata_core::duplicate_data_source),
        help("Each data source key may only be registered once per registry")
    )]
    DuplicateDataSource { key: CompactString },

    #[error("Data source not found: {key}")]
    #[diagnostic(
        code(appdata_core::unknown_data_source),
        help("Registered data sources: {}", available.join(", "))
    )]
    UnknownDataSource {
        key: String,
        available: Vec<String>,
    },

    #[error("Failed to load data source '{key}': {cause}")]
    #[diagnostic(
        code(appdata_core::source_load_failed),
        help("The source was marked as failed; other sources are unaffected")
    )]
    SourceLoad { key: CompactString, cause: String },

    #[error("Failed to fetch application '{application}'")]
    #[diagnostic(
        code(appdata_core::metadata_fetch_failed),
        help("Check that the application exists and the metadata backend is reachable")
    )]
    MetadataFetch {
        application: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid dataSources attribute on application '{application}'")]
    #[diagnostic(
        code(appdata_core::invalid_data_source_config),
        help("Expected an object of the form {{\"enabled\": [..], \"disabled\": [..]}}")
    )]
    InvalidDataSourceConfig {
        application: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("Configuration error for field '{field}'")]
    #[diagnostic(
        code(appdata_core::configuration_error),
        help("Check configuration file at {config_path}\nExpected: {expected}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn unknown_data_source(key: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownDataSource {
            key: key.into(),
            available,
        }
    }

    pub fn source_load(key: impl Into<CompactString>, cause: impl std::fmt::Display) -> Self {
        Self::SourceLoad {
            key: key.into(),
            cause: cause.to_string(),
        }
    }

    /// Wrap any error raised by the metadata backend.
    pub fn metadata_fetch<E>(application: impl Into<String>, cause: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::MetadataFetch {
            application: application.into(),
            cause: cause.into(),
        }
    }
}
