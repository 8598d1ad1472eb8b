//! Reader for YUM primary SQLite databases.
//!
//! The decompressed `primary.sqlite` is written to a temporary file, opened
//! with diesel, and every row of its `packages` table is read back.

use std::io::Write;

use diesel::{
    sql_query,
    sql_types::{BigInt, Nullable, Text},
    Connection, QueryableByName, RunQueryDsl, SqliteConnection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    compression::SQLITE_MAGIC_BYTES,
    error::{ErrorContext, RegistryError, Result},
};

/// A row of the `packages` table in a YUM primary database.
#[derive(Clone, Debug, Default, PartialEq, QueryableByName, Deserialize, Serialize)]
pub struct RpmPackage {
    #[diesel(sql_type = Nullable<BigInt>, column_name = pkgKey)]
    pub pkg_key: Option<i64>,
    #[diesel(sql_type = Nullable<Text>, column_name = pkgId)]
    pub pkg_id: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub arch: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub version: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub epoch: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub release: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub summary: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub url: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub time_file: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub time_build: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_license: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_vendor: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_group: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_buildhost: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_sourcerpm: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub rpm_header_start: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub rpm_header_end: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub rpm_packager: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub size_package: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub size_installed: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub size_archive: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub location_href: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub location_base: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub checksum_type: Option<String>,
}

const SELECT_PACKAGES: &str = "SELECT pkgKey, pkgId, name, arch, version, epoch, release, \
    summary, description, url, time_file, time_build, rpm_license, rpm_vendor, rpm_group, \
    rpm_buildhost, rpm_sourcerpm, rpm_header_start, rpm_header_end, rpm_packager, \
    size_package, size_installed, size_archive, location_href, location_base, checksum_type \
    FROM packages";

/// Reads every package row from a decompressed primary database, in the
/// table's natural row order.
pub fn read_primary_db(data: &[u8]) -> Result<Vec<RpmPackage>> {
    if data.len() < SQLITE_MAGIC_BYTES.len() {
        return Err(RegistryError::MetadataTooShort);
    }
    if !data.starts_with(&SQLITE_MAGIC_BYTES) {
        return Err(RegistryError::Rpm(
            "payload is not a SQLite database".to_string(),
        ));
    }

    let mut tmp = tempfile::Builder::new()
        .prefix("pgext-primary-")
        .suffix(".sqlite")
        .tempfile()
        .with_context(|| "creating temporary primary database".to_string())?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(data)
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    tmp.flush()
        .with_context(|| format!("flushing {}", tmp_path.display()))?;

    let path = tmp_path.to_string_lossy().to_string();
    let mut conn = SqliteConnection::establish(&path)?;
    let packages: Vec<RpmPackage> = sql_query(SELECT_PACKAGES).load(&mut conn)?;
    debug!("read {} rows from primary database", packages.len());

    Ok(packages)
}
