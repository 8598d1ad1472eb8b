//! Conversion of parsed repository rows into [`PackageRecord`]s.

use std::sync::LazyLock;

use pgext_config::repository::{Repository, RepositoryKind};
use pgext_registry::{DebPackage, MetadataContent, RpmPackage};
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    arch::{normalize_arch, Arch, Origin},
    package::PackageRecord,
};

static DEB_PG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^postgresql-(\d{2})-").expect("unable to compile deb pg regex")
});
static RPM_PG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:_|postgresql)(\d{2})(?:-[a-z]+)?$").expect("unable to compile rpm pg regex")
});
static REPO_PG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:pgdg|pgnf)(\d{2})").expect("unable to compile repo pg regex")
});

/// Platform and location facts about the repository a row came from.
#[derive(Clone, Debug)]
pub struct RepoContext {
    pub name: String,
    pub kind: RepositoryKind,
    pub os_code: String,
    pub arch: Arch,
    pub origin: Origin,
    /// URL prefix that package file paths are relative to, ending in `/`.
    pub base_url: String,
    /// PG major implied by the repository itself (`pgdg16`).
    pub pg: Option<u16>,
}

fn base_url(repo: &Repository) -> String {
    let url = repo.url.as_str();
    let base = match repo.kind {
        RepositoryKind::Deb => url.split_once("/dists/").map(|(base, _)| base),
        RepositoryKind::Rpm => url.strip_suffix("/repodata/repomd.xml"),
    };
    let base = base.unwrap_or_else(|| url.rsplit_once('/').map_or(url, |(base, _)| base));
    format!("{}/", base.trim_end_matches('/'))
}

fn capture_pg(re: &Regex, value: &str) -> Option<u16> {
    re.captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl RepoContext {
    pub fn from_repository(repo: &Repository) -> Self {
        let origin = repo
            .origin
            .as_deref()
            .map(Origin::from)
            .unwrap_or_else(|| Origin::from_repo_tag(repo.origin_tag()));

        Self {
            name: repo.name.clone(),
            kind: repo.kind,
            os_code: repo.os_code().to_string(),
            arch: normalize_arch(repo.arch_alias()),
            origin,
            base_url: base_url(repo),
            pg: capture_pg(&REPO_PG_RE, repo.origin_tag()),
        }
    }

    fn resolve_arch(&self, raw: Option<&str>) -> Arch {
        match raw.map(str::trim) {
            None | Some("" | "all" | "noarch") => self.arch,
            Some(raw) => normalize_arch(raw),
        }
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

pub fn normalize_deb(ctx: &RepoContext, pkg: &DebPackage) -> PackageRecord {
    PackageRecord {
        repo: ctx.name.clone(),
        name: pkg.package.clone(),
        os_code: ctx.os_code.clone(),
        arch: ctx.resolve_arch(pkg.architecture.as_deref()),
        pg: capture_pg(&DEB_PG_RE, &pkg.package),
        origin: ctx.origin,
        version: pkg.version.clone().unwrap_or_default(),
        release: None,
        file: pkg
            .filename
            .as_deref()
            .and_then(|f| f.rsplit('/').next())
            .map(String::from),
        url: pkg.filename.as_deref().map(|f| ctx.join(f)),
        sha256: pkg.sha256.clone(),
        size: pkg.size,
        miss: false,
        hide: false,
        warn: false,
    }
}

/// Returns `None` for rows without a package name.
pub fn normalize_rpm(ctx: &RepoContext, pkg: &RpmPackage) -> Option<PackageRecord> {
    let name = pkg.name.clone().filter(|n| !n.is_empty())?;
    let sha256 = match pkg.checksum_type.as_deref() {
        Some("sha256") => pkg.pkg_id.clone(),
        _ => None,
    };

    Some(PackageRecord {
        repo: ctx.name.clone(),
        pg: capture_pg(&RPM_PG_RE, &name).or(ctx.pg),
        os_code: ctx.os_code.clone(),
        arch: ctx.resolve_arch(pkg.arch.as_deref()),
        origin: ctx.origin,
        version: pkg.version.clone().unwrap_or_default(),
        release: pkg.release.clone(),
        file: pkg
            .location_href
            .as_deref()
            .and_then(|f| f.rsplit('/').next())
            .map(String::from),
        url: pkg.location_href.as_deref().map(|f| ctx.join(f)),
        sha256,
        size: pkg.size_package.unwrap_or(0),
        miss: false,
        hide: false,
        warn: false,
        name,
    })
}

/// Normalises every parsed row, preserving input order.
///
/// RPM rows without a package name are dropped and reported in a single
/// warning per repository.
pub fn normalize_content(ctx: &RepoContext, content: &MetadataContent) -> Vec<PackageRecord> {
    let records: Vec<PackageRecord> = match content {
        MetadataContent::Deb(packages) => packages.iter().map(|p| normalize_deb(ctx, p)).collect(),
        MetadataContent::Rpm(packages) => {
            let records: Vec<PackageRecord> = packages
                .iter()
                .filter_map(|p| normalize_rpm(ctx, p))
                .collect();
            let skipped = packages.len() - records.len();
            if skipped > 0 {
                warn!(
                    repo = ctx.name.as_str(),
                    skipped = skipped,
                    "skipped RPM rows without a package name"
                );
            }
            records
        }
    };
    debug!(repo = ctx.name.as_str(), count = records.len(), "normalised package records");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::capture_logs;

    fn deb_repo() -> RepoContext {
        RepoContext::from_repository(&Repository::new(
            "u24.arm.pgdg",
            "https://download.postgresql.org/pub/repos/apt/dists/noble-pgdg/main/binary-arm64/Packages",
            RepositoryKind::Deb,
        ))
    }

    fn rpm_repo(name: &str) -> RepoContext {
        RepoContext::from_repository(&Repository::new(
            name,
            "https://download.postgresql.org/pub/repos/yum/16/redhat/rhel-9-x86_64/repodata/repomd.xml",
            RepositoryKind::Rpm,
        ))
    }

    #[test]
    fn test_repo_context() {
        let ctx = deb_repo();
        assert_eq!(ctx.os_code, "u24");
        assert_eq!(ctx.arch, Arch::Aarch64);
        assert_eq!(ctx.origin, Origin::Pgdg);
        assert_eq!(ctx.base_url, "https://download.postgresql.org/pub/repos/apt/");
        assert_eq!(ctx.pg, None);

        let ctx = rpm_repo("el9.amd.pgdg16");
        assert_eq!(ctx.pg, Some(16));
        assert_eq!(
            ctx.base_url,
            "https://download.postgresql.org/pub/repos/yum/16/redhat/rhel-9-x86_64/"
        );

        let mut repo = Repository::new("el9.amd.citus", "https://x/repodata/repomd.xml", RepositoryKind::Rpm);
        repo.origin = Some("pigsty".into());
        assert_eq!(RepoContext::from_repository(&repo).origin, Origin::Pigsty);
    }

    #[test]
    fn test_normalize_deb() {
        let pkg = DebPackage {
            package: "postgresql-17-pgvector".into(),
            version: Some("0.8.0-1.pgdg24.04+1".into()),
            architecture: Some("all".into()),
            filename: Some("pool/main/p/pgvector/postgresql-17-pgvector_0.8.0_arm64.deb".into()),
            size: 42,
            ..Default::default()
        };
        let record = normalize_deb(&deb_repo(), &pkg);

        assert_eq!(record.pg, Some(17));
        assert_eq!(record.arch, Arch::Aarch64);
        assert_eq!(record.file.as_deref(), Some("postgresql-17-pgvector_0.8.0_arm64.deb"));
        assert_eq!(
            record.url.as_deref(),
            Some("https://download.postgresql.org/pub/repos/apt/pool/main/p/pgvector/postgresql-17-pgvector_0.8.0_arm64.deb")
        );
        assert_eq!(record.size, 42);
    }

    #[test]
    fn test_normalize_rpm() {
        let ctx = rpm_repo("el9.amd.pgdg16");
        let pkg = RpmPackage {
            name: Some("pg_cron_16".into()),
            arch: Some("x86_64".into()),
            version: Some("1.6.4".into()),
            release: Some("1PGDG.rhel9".into()),
            pkg_id: Some("abcd".into()),
            checksum_type: Some("sha256".into()),
            location_href: Some("pg_cron_16-1.6.4-1PGDG.rhel9.x86_64.rpm".into()),
            size_package: Some(1000),
            ..Default::default()
        };
        let record = normalize_rpm(&ctx, &pkg).unwrap();
        assert_eq!(record.pg, Some(16));
        assert_eq!(record.sha256.as_deref(), Some("abcd"));
        assert_eq!(record.release.as_deref(), Some("1PGDG.rhel9"));
        assert_eq!(record.size, 1000);

        let unsuffixed = RpmPackage {
            name: Some("pgbouncer".into()),
            arch: Some("noarch".into()),
            checksum_type: Some("sha1".into()),
            pkg_id: Some("ffff".into()),
            ..Default::default()
        };
        let record = normalize_rpm(&ctx, &unsuffixed).unwrap();
        assert_eq!(record.pg, Some(16), "falls back to the repository's major");
        assert_eq!(record.arch, Arch::X86_64);
        assert_eq!(record.sha256, None);

        let pigsty = rpm_repo("el9.amd.pigsty");
        let record = normalize_rpm(&pigsty, &unsuffixed).unwrap();
        assert_eq!(record.pg, None);

        assert!(normalize_rpm(&ctx, &RpmPackage::default()).is_none());
    }

    #[test]
    fn test_nameless_rpm_rows_are_counted_once() {
        let ctx = rpm_repo("el9.amd.pgdg16");
        let named = RpmPackage {
            name: Some("pg_cron_16".into()),
            ..Default::default()
        };
        let blank = RpmPackage {
            name: Some(String::new()),
            ..Default::default()
        };
        let content = MetadataContent::Rpm(vec![
            RpmPackage::default(),
            named,
            blank,
            RpmPackage::default(),
        ]);

        let (records, logs) = capture_logs(|| normalize_content(&ctx, &content));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "pg_cron_16");

        let warnings: Vec<&str> = logs.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "{logs}");
        assert!(warnings[0].contains("skipped RPM rows without a package name"));
        assert!(warnings[0].contains("skipped=3"), "{logs}");
        assert!(warnings[0].contains("repo=\"el9.amd.pgdg16\""), "{logs}");
    }

    #[test]
    fn test_complete_rpm_rows_log_no_warning() {
        let ctx = rpm_repo("el9.amd.pgdg16");
        let content = MetadataContent::Rpm(vec![RpmPackage {
            name: Some("pg_cron_16".into()),
            ..Default::default()
        }]);
        let (_, logs) = capture_logs(|| normalize_content(&ctx, &content));
        assert!(!logs.contains("WARN"), "{logs}");
    }

    #[test]
    fn test_rpm_pg_suffix_patterns() {
        assert_eq!(capture_pg(&RPM_PG_RE, "postgis35_17"), Some(17));
        assert_eq!(capture_pg(&RPM_PG_RE, "pg_cron_16-llvmjit"), Some(16));
        assert_eq!(capture_pg(&RPM_PG_RE, "postgresql16-contrib"), Some(16));
        assert_eq!(capture_pg(&RPM_PG_RE, "timescaledb-2-postgresql17"), Some(17));
        assert_eq!(capture_pg(&RPM_PG_RE, "pgbouncer"), None);
    }
}
