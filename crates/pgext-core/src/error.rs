//! Error types for pgext-core.

use miette::Diagnostic;
use pgext_utils::error::FileSystemError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] pgext_config::error::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] pgext_db::DbError),

    #[error(transparent)]
    #[diagnostic(code(pgext::fs), help("Check file permissions and disk space"))]
    FileSystem(#[from] FileSystemError),

    #[error("Error while {action}")]
    #[diagnostic(code(pgext::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(
        code(pgext::csv),
        help("Check that the CSV header matches the expected columns")
    )]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Extension '{0}' not found")]
    #[diagnostic(
        code(pgext::extension_not_found),
        help("Check the extension or package name against the catalog")
    )]
    ExtensionNotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
