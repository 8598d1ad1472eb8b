use miette::Diagnostic;
use pgext_utils::error::{FileSystemError, PathError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(pgext_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pgext_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {0}")]
    #[diagnostic(
        code(pgext_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("Invalid repository name: {0}")]
    #[diagnostic(
        code(pgext_config::invalid_repository),
        help("Repository names take the form <os>.<arch>.<origin>, e.g. `u24.amd.pgdg`")
    )]
    InvalidRepository(String),

    #[error("Invalid repository URL: {0}")]
    #[diagnostic(
        code(pgext_config::invalid_repository_url),
        help("Repository URLs must be absolute http(s) URLs with a host")
    )]
    InvalidRepositoryUrl(String),

    #[error("RPM repository URL does not point at repodata/repomd.xml: {0}")]
    #[diagnostic(
        code(pgext_config::invalid_rpm_index),
        help("Use the full index URL, e.g. `https://host/el9.x86_64/repodata/repomd.xml`")
    )]
    InvalidRpmIndexUrl(String),

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(pgext_config::duplicate_repo),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("`{key}` lists `{value}` more than once")]
    #[diagnostic(
        code(pgext_config::duplicate_grid_value),
        help("Each OS, architecture and PostgreSQL version may appear only once")
    )]
    DuplicateGridValue { key: &'static str, value: String },

    #[error("Invalid value for `{key}`: {value}")]
    #[diagnostic(code(pgext_config::invalid_value))]
    InvalidValue { key: &'static str, value: String },

    #[error("`{0}` must not be empty")]
    #[diagnostic(
        code(pgext_config::empty_grid),
        help("The availability grid needs at least one OS, architecture and PostgreSQL version")
    )]
    EmptyGrid(&'static str),

    #[error("IO error: {0}")]
    #[diagnostic(code(pgext_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(pgext_config::path))]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(code(pgext_config::fs))]
    FileSystem(#[from] FileSystemError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(pgext_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(pgext_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("Failed to annotate first table in array: {0}")]
    #[diagnostic(code(pgext_config::annotate_first_table))]
    AnnotateFirstTable(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
