//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ItemError;
use quiz_core::{GenerateError, ProtocolViolation, ScoringPolicyError, SessionSetupError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ItemCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has {available} usable items, at least {required} required")]
    EmptyCatalog { required: usize, available: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("no signed-in identity")]
    MissingIdentity,
    #[error(transparent)]
    Settings(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

/// A completed result could not be written to the result sink.
///
/// Never fatal to the session: the result is still handed back to the caller.
#[derive(Debug, Error)]
#[error("quiz result was not persisted: {source}")]
pub struct PersistFailure {
    #[source]
    source: StorageError,
}

impl PersistFailure {
    #[must_use]
    pub fn new(source: StorageError) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn storage_error(&self) -> &StorageError {
        &self.source
    }
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("no signed-in identity")]
    MissingIdentity,
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error("no signed-in identity")]
    MissingIdentity,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid quiz settings: {0}")]
    InvalidSettings(&'static str),
    #[error(transparent)]
    Scoring(#[from] ScoringPolicyError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
