//! Repository pattern implementations for database operations.
//!
//! - [`RepoDataRepository`] - stored payloads and cache validators
//! - [`AptRepository`] / [`YumRepository`] - parsed metadata rows
//! - [`PackageRepository`] - normalised package records
//!
//! [`persist_repository`] writes everything for one repository in a single
//! transaction.

pub mod apt;
pub mod package;
pub mod repo_data;
pub mod yum;

use diesel::{Connection, SqliteConnection};
use pgext_registry::MetadataContent;
use tracing::debug;

pub use apt::AptRepository;
pub use package::PackageRepository;
pub use repo_data::RepoDataRepository;
pub use yum::YumRepository;

use crate::{
    error::{DbError, Result},
    models::{NewPackageRow, NewRepoData},
};

/// Upserts `repo_data` and replaces the repository's `apt`/`yum`/`package`
/// rows. Nothing is written if any statement fails.
pub fn persist_repository(
    conn: &mut SqliteConnection,
    repo_data: &NewRepoData<'_>,
    content: &MetadataContent,
    packages: &[NewPackageRow],
) -> Result<()> {
    conn.immediate_transaction::<_, DbError, _>(|conn| {
        RepoDataRepository::upsert(conn, repo_data)?;
        let raw = match content {
            MetadataContent::Deb(rows) => AptRepository::replace(conn, repo_data.id, rows)?,
            MetadataContent::Rpm(rows) => YumRepository::replace(conn, repo_data.id, rows)?,
        };
        let normalised = PackageRepository::replace(conn, repo_data.id, packages)?;
        debug!(
            repo = repo_data.id,
            raw = raw,
            packages = normalised,
            "persisted repository"
        );
        Ok(())
    })
}

/// Replaces parsed rows without touching `repo_data`.
pub fn replace_parsed(
    conn: &mut SqliteConnection,
    repo: &str,
    content: &MetadataContent,
    packages: &[NewPackageRow],
) -> Result<()> {
    conn.immediate_transaction::<_, DbError, _>(|conn| {
        match content {
            MetadataContent::Deb(rows) => AptRepository::replace(conn, repo, rows)?,
            MetadataContent::Rpm(rows) => YumRepository::replace(conn, repo, rows)?,
        };
        PackageRepository::replace(conn, repo, packages)?;
        Ok(())
    })
}
