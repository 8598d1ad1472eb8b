//! Error types for pgext-operations.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum OperationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] pgext_config::error::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] pgext_core::CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] pgext_db::DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] pgext_dl::DownloadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] pgext_registry::RegistryError),

    #[error(transparent)]
    #[diagnostic(code(pgext::fs), help("Check file permissions and disk space"))]
    FileSystem(#[from] pgext_utils::error::FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(pgext::json))]
    Json(#[from] serde_json::Error),

    #[error("Unknown or disabled repository: {0}")]
    #[diagnostic(
        code(pgext::unknown_repository),
        help("Check the repository names in your configuration")
    )]
    UnknownRepository(String),

    #[error("Worker task failed: {0}")]
    #[diagnostic(code(pgext::worker))]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, OperationError>;
