#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod library_service;
pub mod logging;
pub mod quiz;
pub mod results_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::ItemCatalog;
pub use config::{EngineConfig, QuizSettings};
pub use error::{
    AppServicesError, CatalogError, ConfigError, LibraryError, PersistFailure, QuizServiceError,
    ResultsError,
};
pub use identity::{Anonymous, IdentityProvider, SignedInIdentity, StaticIdentity};
pub use library_service::{LibraryEntry, LibraryService};
pub use logging::init_tracing;
pub use quiz::{ActiveQuiz, AdvanceOutcome, QuizCompletion, QuizRequest, QuizService};
pub use results_service::ResultsService;
