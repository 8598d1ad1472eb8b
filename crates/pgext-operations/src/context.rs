//! Per-run context shared by every operation.

use std::{path::PathBuf, sync::Arc};

use pgext_config::config::Config;
use pgext_core::{
    catalog::{load_packages_csv, Catalog},
    Grid, PackageRecord,
};
use pgext_db::{repository::PackageRepository, DbConnection, DbError};
use pgext_dl::{HttpTransport, Transport};
use pgext_utils::fs::ensure_dir_exists;
use tracing::debug;

use crate::error::Result;

/// Configuration and transport of one run.
///
/// Constructed once by the caller and cloned into worker tasks; nothing in
/// it is mutated after construction.
#[derive(Clone)]
pub struct PgextContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl PgextContext {
    /// Creates a context that talks to repositories over HTTP.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ContextInner { config, transport }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.inner.transport.clone()
    }

    pub fn grid(&self) -> Grid {
        Grid::from_config(self.config())
    }

    /// Path of the package store, with its directory created.
    pub fn db_path(&self) -> Result<PathBuf> {
        let path = self.config().get_db_path()?;
        if let Some(parent) = path.parent() {
            ensure_dir_exists(parent)?;
        }
        Ok(path)
    }

    /// Opens the package store, applying pending migrations.
    pub fn open_db(&self) -> Result<DbConnection> {
        Ok(DbConnection::open(self.db_path()?)?)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::load(self.config().get_catalog_path()?)?)
    }

    /// Loads every package record, from `packages_csv` when configured and
    /// from the database otherwise.
    pub fn load_records(&self) -> Result<Vec<PackageRecord>> {
        if let Some(csv) = self.config().get_packages_csv()? {
            debug!("loading package records from {}", csv.display());
            return Ok(load_packages_csv(csv)?);
        }

        let mut db = self.open_db()?;
        let rows = PackageRepository::list_all(db.conn()).map_err(DbError::from)?;
        debug!(count = rows.len(), "loaded package records from database");
        Ok(rows.into_iter().map(PackageRecord::from).collect())
    }
}
