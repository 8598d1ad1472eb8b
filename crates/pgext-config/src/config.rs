use std::{
    collections::HashSet,
    fs,
    hash::Hash,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use pgext_utils::{
    path::{resolve_path, xdg_config_home, xdg_data_home},
    time::parse_timeout,
};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    repository::{default_repositories, Repository},
};

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_METADATA_TIMEOUT: &str = "30s";
pub const DEFAULT_PAYLOAD_TIMEOUT: &str = "2m";
pub const DEFAULT_OS: [&str; 5] = ["el8", "el9", "d12", "u22", "u24"];
pub const DEFAULT_ARCH: [&str; 2] = ["x86_64", "aarch64"];
pub const DEFAULT_PG_VERSIONS: [u16; 5] = [17, 16, 15, 14, 13];

/// Configuration of the extension catalog pipeline
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Directory holding the package store (`pgext.db`).
    /// Default: $XDG_DATA_HOME/pgext
    pub data_path: Option<String>,

    /// Path to the extension catalog CSV.
    /// Default: data/extension.csv
    pub catalog_path: Option<String>,

    /// Optional package CSV used as the package store instead of the database.
    pub packages_csv: Option<String>,

    /// Directory where per-extension JSON documents are written.
    /// Default: data/ext
    pub output_path: Option<String>,

    /// Number of repositories synced concurrently.
    /// Default: 4
    pub workers: Option<usize>,

    /// Timeout for HEAD probes and index downloads (e.g. "30s").
    /// Default: "30s"
    pub metadata_timeout: Option<String>,

    /// Timeout for RPM primary database downloads (e.g. "2m").
    /// Default: "2m"
    pub payload_timeout: Option<String>,

    /// Operating system codes forming the rows of the availability matrix.
    pub os: Vec<String>,

    /// Normalized architectures of the availability matrix.
    pub arch: Vec<String>,

    /// PostgreSQL major versions forming the columns of the availability matrix.
    pub pg_versions: Vec<u16>,

    /// List of configured repositories.
    pub repositories: Vec<Repository>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Location of the configuration file: `$PGEXT_CONFIG`, else
/// `$XDG_CONFIG_HOME/pgext/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var("PGEXT_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("pgext").join("config.toml"),
    }
}

/// Rejects grid axes that name the same value twice.
fn ensure_unique<T>(key: &'static str, values: &[T]) -> Result<()>
where
    T: Eq + Hash + ToString,
{
    let mut seen = HashSet::new();
    match values.iter().find(|value| !seen.insert(*value)) {
        Some(duplicate) => {
            Err(ConfigError::DuplicateGridValue {
                key,
                value: duplicate.to_string(),
            })
        }
        None => Ok(()),
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            data_path: Some(format!("{}/pgext", xdg_data_home().display())),
            catalog_path: Some("data/extension.csv".to_string()),
            packages_csv: None,
            output_path: Some("data/ext".to_string()),
            workers: Some(DEFAULT_WORKERS),
            metadata_timeout: Some(DEFAULT_METADATA_TIMEOUT.to_string()),
            payload_timeout: Some(DEFAULT_PAYLOAD_TIMEOUT.to_string()),
            os: DEFAULT_OS.iter().map(|s| s.to_string()).collect(),
            arch: DEFAULT_ARCH.iter().map(|s| s.to_string()).collect(),
            pg_versions: DEFAULT_PG_VERSIONS.to_vec(),
            repositories: default_repositories(),
        }
    }

    /// Loads the configuration from `path`, or from [`default_config_path`].
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => {
                debug!("loading configuration from {}", config_path.display());
                toml::from_str(&content)?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no configuration at {}, using defaults",
                    config_path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    /// Fills defaults and validates the configuration.
    pub fn resolve(&mut self) -> Result<()> {
        let workers = *self.workers.get_or_insert(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "workers",
                value: workers.to_string(),
            });
        }

        let metadata_timeout = self
            .metadata_timeout
            .get_or_insert_with(|| DEFAULT_METADATA_TIMEOUT.to_string());
        if parse_timeout(metadata_timeout).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "metadata_timeout",
                value: metadata_timeout.clone(),
            });
        }

        let payload_timeout = self
            .payload_timeout
            .get_or_insert_with(|| DEFAULT_PAYLOAD_TIMEOUT.to_string());
        if parse_timeout(payload_timeout).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "payload_timeout",
                value: payload_timeout.clone(),
            });
        }

        if self.os.is_empty() {
            return Err(ConfigError::EmptyGrid("os"));
        }
        if self.arch.is_empty() {
            return Err(ConfigError::EmptyGrid("arch"));
        }
        if self.pg_versions.is_empty() {
            return Err(ConfigError::EmptyGrid("pg_versions"));
        }
        ensure_unique("os", &self.os)?;
        ensure_unique("arch", &self.arch)?;
        ensure_unique("pg_versions", &self.pg_versions)?;

        let mut seen_repos = HashSet::new();
        for repo in &mut self.repositories {
            repo.validate()?;
            if !seen_repos.insert(repo.name.clone()) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }
            repo.enabled.get_or_insert(true);
        }

        Ok(())
    }

    pub fn get_data_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("PGEXT_DATA") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.data_path {
            Some(path) => Ok(resolve_path(path)?),
            None => Ok(xdg_data_home().join("pgext")),
        }
    }

    pub fn get_db_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_path()?.join("pgext.db"))
    }

    pub fn get_catalog_path(&self) -> Result<PathBuf> {
        Ok(resolve_path(
            self.catalog_path.as_deref().unwrap_or("data/extension.csv"),
        )?)
    }

    pub fn get_packages_csv(&self) -> Result<Option<PathBuf>> {
        self.packages_csv
            .as_deref()
            .map(|path| resolve_path(path).map_err(ConfigError::from))
            .transpose()
    }

    pub fn get_output_path(&self) -> Result<PathBuf> {
        Ok(resolve_path(self.output_path.as_deref().unwrap_or("data/ext"))?)
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS).max(1)
    }

    pub fn metadata_timeout(&self) -> Duration {
        self.metadata_timeout
            .as_deref()
            .and_then(parse_timeout)
            .unwrap_or(Duration::from_secs(30))
    }

    pub fn payload_timeout(&self) -> Duration {
        self.payload_timeout
            .as_deref()
            .and_then(parse_timeout)
            .unwrap_or(Duration::from_secs(120))
    }

    pub fn get_repository(&self, repo_name: &str) -> Option<&Repository> {
        self.repositories
            .iter()
            .find(|repo| repo.name == repo_name && repo.is_enabled())
    }

    pub fn enabled_repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.iter().filter(|repo| repo.is_enabled())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(repositories_item) = doc.get_mut("repositories") {
            if let Some(repositories_array) = repositories_item.as_array_of_tables_mut() {
                annotate_toml_array_of_tables::<Repository>(repositories_array)?;
            }
        }

        Ok(doc)
    }
}

/// Writes the annotated default configuration to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.display().to_string()));
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}
