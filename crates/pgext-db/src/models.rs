use diesel::prelude::*;
use pgext_registry::{DebPackage, RpmPackage};

use crate::schema::{apt, package, repo_data, yum};

/// Stored payload and cache validators of one repository.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = repo_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RepoData {
    pub id: String,
    pub kind: String,
    pub etag: Option<String>,
    pub size: Option<i64>,
    pub last_modified: Option<String>,
    pub data: Option<Vec<u8>>,
    pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = repo_data)]
#[diesel(treat_none_as_null = true)]
pub struct NewRepoData<'a> {
    pub id: &'a str,
    pub kind: &'a str,
    pub etag: Option<&'a str>,
    pub size: Option<i64>,
    pub last_modified: Option<&'a str>,
    pub data: Option<&'a [u8]>,
    pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = apt)]
#[diesel(treat_none_as_null = true)]
pub struct NewApt<'a> {
    pub repo: &'a str,
    pub package: &'a str,
    pub version: Option<&'a str>,
    pub architecture: Option<&'a str>,
    pub size: i64,
    pub installed_size: i64,
    pub priority: Option<&'a str>,
    pub section: Option<&'a str>,
    pub filename: Option<&'a str>,
    pub sha256: Option<&'a str>,
    pub sha1: Option<&'a str>,
    pub md5sum: Option<&'a str>,
    pub maintainer: Option<&'a str>,
    pub homepage: Option<&'a str>,
    pub depends: Option<&'a str>,
    pub source: Option<&'a str>,
    pub provides: Option<&'a str>,
    pub recommends: Option<&'a str>,
    pub suggests: Option<&'a str>,
    pub conflicts: Option<&'a str>,
    pub breaks: Option<&'a str>,
    pub replaces: Option<&'a str>,
    pub enhances: Option<&'a str>,
    pub pre_depends: Option<&'a str>,
    pub build_ids: Option<&'a str>,
    pub package_type: Option<&'a str>,
    pub auto_built_package: Option<&'a str>,
    pub multi_arch: Option<&'a str>,
    pub description: Option<&'a str>,
    pub extra: Option<String>,
}

impl<'a> NewApt<'a> {
    pub fn from_deb(repo: &'a str, pkg: &'a DebPackage) -> serde_json::Result<Self> {
        let extra = if pkg.extra.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&pkg.extra)?)
        };

        Ok(Self {
            repo,
            package: &pkg.package,
            version: pkg.version.as_deref(),
            architecture: pkg.architecture.as_deref(),
            size: pkg.size,
            installed_size: pkg.installed_size,
            priority: pkg.priority.as_deref(),
            section: pkg.section.as_deref(),
            filename: pkg.filename.as_deref(),
            sha256: pkg.sha256.as_deref(),
            sha1: pkg.sha1.as_deref(),
            md5sum: pkg.md5sum.as_deref(),
            maintainer: pkg.maintainer.as_deref(),
            homepage: pkg.homepage.as_deref(),
            depends: pkg.depends.as_deref(),
            source: pkg.source.as_deref(),
            provides: pkg.provides.as_deref(),
            recommends: pkg.recommends.as_deref(),
            suggests: pkg.suggests.as_deref(),
            conflicts: pkg.conflicts.as_deref(),
            breaks: pkg.breaks.as_deref(),
            replaces: pkg.replaces.as_deref(),
            enhances: pkg.enhances.as_deref(),
            pre_depends: pkg.pre_depends.as_deref(),
            build_ids: pkg.build_ids.as_deref(),
            package_type: pkg.package_type.as_deref(),
            auto_built_package: pkg.auto_built_package.as_deref(),
            multi_arch: pkg.multi_arch.as_deref(),
            description: pkg.description.as_deref(),
            extra,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = yum)]
#[diesel(treat_none_as_null = true)]
pub struct NewYum<'a> {
    pub repo: &'a str,
    pub pkg_key: Option<i64>,
    pub pkg_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub arch: Option<&'a str>,
    pub version: Option<&'a str>,
    pub epoch: Option<&'a str>,
    pub release: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub description: Option<&'a str>,
    pub url: Option<&'a str>,
    pub time_file: Option<i64>,
    pub time_build: Option<i64>,
    pub rpm_license: Option<&'a str>,
    pub rpm_vendor: Option<&'a str>,
    pub rpm_group: Option<&'a str>,
    pub rpm_buildhost: Option<&'a str>,
    pub rpm_sourcerpm: Option<&'a str>,
    pub rpm_header_start: Option<i64>,
    pub rpm_header_end: Option<i64>,
    pub rpm_packager: Option<&'a str>,
    pub size_package: Option<i64>,
    pub size_installed: Option<i64>,
    pub size_archive: Option<i64>,
    pub location_href: Option<&'a str>,
    pub location_base: Option<&'a str>,
    pub checksum_type: Option<&'a str>,
}

impl<'a> NewYum<'a> {
    pub fn from_rpm(repo: &'a str, pkg: &'a RpmPackage) -> Self {
        Self {
            repo,
            pkg_key: pkg.pkg_key,
            pkg_id: pkg.pkg_id.as_deref(),
            name: pkg.name.as_deref(),
            arch: pkg.arch.as_deref(),
            version: pkg.version.as_deref(),
            epoch: pkg.epoch.as_deref(),
            release: pkg.release.as_deref(),
            summary: pkg.summary.as_deref(),
            description: pkg.description.as_deref(),
            url: pkg.url.as_deref(),
            time_file: pkg.time_file,
            time_build: pkg.time_build,
            rpm_license: pkg.rpm_license.as_deref(),
            rpm_vendor: pkg.rpm_vendor.as_deref(),
            rpm_group: pkg.rpm_group.as_deref(),
            rpm_buildhost: pkg.rpm_buildhost.as_deref(),
            rpm_sourcerpm: pkg.rpm_sourcerpm.as_deref(),
            rpm_header_start: pkg.rpm_header_start,
            rpm_header_end: pkg.rpm_header_end,
            rpm_packager: pkg.rpm_packager.as_deref(),
            size_package: pkg.size_package,
            size_installed: pkg.size_installed,
            size_archive: pkg.size_archive,
            location_href: pkg.location_href.as_deref(),
            location_base: pkg.location_base.as_deref(),
            checksum_type: pkg.checksum_type.as_deref(),
        }
    }
}

/// A normalised package record as stored.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = package)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageRow {
    pub id: i32,
    pub repo: String,
    pub name: String,
    pub os_code: String,
    pub arch: String,
    pub pg: Option<i32>,
    pub origin: String,
    pub version: String,
    pub release: Option<String>,
    pub file: Option<String>,
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub size: i64,
    pub miss: bool,
    pub hide: bool,
    pub warn: bool,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = package)]
#[diesel(treat_none_as_null = true)]
pub struct NewPackageRow {
    pub repo: String,
    pub name: String,
    pub os_code: String,
    pub arch: String,
    pub pg: Option<i32>,
    pub origin: String,
    pub version: String,
    pub release: Option<String>,
    pub file: Option<String>,
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub size: i64,
    pub miss: bool,
    pub hide: bool,
    pub warn: bool,
}
