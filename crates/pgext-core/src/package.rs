use pgext_db::models::{NewPackageRow, PackageRow};
use serde::{Deserialize, Serialize};

use crate::arch::{normalize_arch, Arch, Origin};

/// One build artifact for one (package, OS, architecture, PG major) slot.
///
/// `pg` is `None` for version-independent packages, which fill every PG
/// column of their platform.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PackageRecord {
    pub repo: String,
    pub name: String,
    pub os_code: String,
    pub arch: Arch,
    pub pg: Option<u16>,
    pub origin: Origin,
    pub version: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub miss: bool,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub warn: bool,
}

impl PackageRecord {
    pub fn to_row(&self) -> NewPackageRow {
        NewPackageRow {
            repo: self.repo.clone(),
            name: self.name.clone(),
            os_code: self.os_code.clone(),
            arch: self.arch.as_str().to_string(),
            pg: self.pg.map(i32::from),
            origin: self.origin.as_str().to_string(),
            version: self.version.clone(),
            release: self.release.clone(),
            file: self.file.clone(),
            url: self.url.clone(),
            sha256: self.sha256.clone(),
            size: self.size,
            miss: self.miss,
            hide: self.hide,
            warn: self.warn,
        }
    }
}

impl From<PackageRow> for PackageRecord {
    fn from(row: PackageRow) -> Self {
        Self {
            arch: normalize_arch(&row.arch),
            origin: Origin::from(row.origin.as_str()),
            pg: row.pg.and_then(|pg| u16::try_from(pg).ok()),
            repo: row.repo,
            name: row.name,
            os_code: row.os_code,
            version: row.version,
            release: row.release,
            file: row.file,
            url: row.url,
            sha256: row.sha256,
            size: row.size,
            miss: row.miss,
            hide: row.hide,
            warn: row.warn,
        }
    }
}
