//! Error types for the registry crate.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while fetching or parsing repository metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(pgext_registry::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] pgext_dl::DownloadError),

    #[error("Remote returned HTTP {status} for {url}")]
    #[diagnostic(
        code(pgext_registry::http_status),
        help("Verify the repository URL is correct and accessible")
    )]
    HttpStatus { status: u16, url: String },

    #[error("Invalid repomd.xml: {0}")]
    #[diagnostic(
        code(pgext_registry::repomd),
        help("The repository index may be corrupted or in an unexpected format")
    )]
    Repomd(String),

    #[error("No primary_db entry in {url}")]
    #[diagnostic(code(pgext_registry::missing_primary_db))]
    MissingPrimaryDb { url: String },

    #[error("No sha256 open-checksum for the primary database in {url}")]
    #[diagnostic(code(pgext_registry::missing_checksum))]
    MissingChecksum { url: String },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(pgext_registry::checksum_mismatch),
        help("The downloaded metadata is untrustworthy and was discarded; retry later")
    )]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to decompress {format} payload: {source}")]
    #[diagnostic(code(pgext_registry::decompress))]
    Decompress {
        format: &'static str,
        source: std::io::Error,
    },

    #[error("Invalid URL: {0}")]
    #[diagnostic(
        code(pgext_registry::invalid_url),
        help("Ensure the URL is valid and properly formatted")
    )]
    InvalidUrl(String),

    #[error("Metadata content is too short")]
    #[diagnostic(
        code(pgext_registry::metadata_too_short),
        help("The metadata file appears to be corrupted or incomplete")
    )]
    MetadataTooShort,

    #[error("Failed to read RPM primary database: {0}")]
    #[diagnostic(code(pgext_registry::rpm))]
    Rpm(String),
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

impl From<diesel::result::Error> for RegistryError {
    fn from(err: diesel::result::Error) -> Self {
        RegistryError::Rpm(err.to_string())
    }
}

impl From<diesel::ConnectionError> for RegistryError {
    fn from(err: diesel::ConnectionError) -> Self {
        RegistryError::Rpm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::MetadataTooShort;
        assert_eq!(err.to_string(), "Metadata content is too short");

        let err = RegistryError::ChecksumMismatch {
            url: "https://x/primary.sqlite.bz2".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch for https://x/primary.sqlite.bz2: expected aa, got bb"
        );
    }

    #[test]
    fn test_with_context() {
        let result: std::io::Result<()> = Err(std::io::Error::other("disk full"));
        let err = result
            .with_context(|| "writing primary database".to_string())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error while writing primary database: disk full"
        );
    }
}
