//! Shared configuration and reference data for the voicelead workspace.
//!
//! Holds the env-driven [`AppConfig`], the service-branch reference data
//! loaded from YAML, and the [`Severity`] taxonomy shared by the pipeline
//! and the operational triage views that consume its error payloads.

mod app_config;
mod branches;
mod config;
mod severity;

pub use app_config::{AppConfig, Environment};
pub use branches::{load_branches, Branch, BranchesFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use severity::Severity;

use thiserror::Error;

/// Errors raised while loading configuration or reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read branches file at {path}: {source}")]
    BranchesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse branches file: {0}")]
    BranchesFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
