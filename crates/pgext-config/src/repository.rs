use std::fmt;

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Metadata format published by a repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// APT repository; the URL points at a `Packages` index.
    Deb,
    /// YUM/DNF repository; the URL points at `repodata/repomd.xml`.
    Rpm,
}

impl RepositoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryKind::Deb => "deb",
            RepositoryKind::Rpm => "rpm",
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines a remote package repository whose metadata is synced.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Repository {
    /// Unique name of the repository, in the form `<os>.<arch>.<origin>`
    /// (e.g. `u24.amd.pgdg`, `el9.arm.pigsty`, `el8.amd.pgnf16`).
    pub name: String,

    /// URL of the repository index: a `Packages` file for deb repositories,
    /// `repodata/repomd.xml` for rpm repositories.
    pub url: String,

    /// Metadata format of the repository: "deb" or "rpm".
    pub kind: RepositoryKind,

    /// Whether the repository is enabled.
    /// Default: true
    pub enabled: Option<bool>,

    /// Overrides the origin derived from the name (PIGSTY, PGDG, CONTRIB, OTHER).
    pub origin: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: RepositoryKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
            enabled: Some(true),
            origin: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// OS code segment of the name, e.g. `u24`.
    pub fn os_code(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    /// Architecture alias segment of the name, e.g. `amd`.
    pub fn arch_alias(&self) -> &str {
        self.name.split('.').nth(1).unwrap_or_default()
    }

    /// Origin segment of the name, e.g. `pgdg16`.
    pub fn origin_tag(&self) -> &str {
        self.name.splitn(3, '.').nth(2).unwrap_or_default()
    }

    /// Checks that the name has the `<os>.<arch>.<origin>` shape, that the
    /// URL is an absolute http(s) URL with a host, and that rpm URLs end in
    /// `/repodata/repomd.xml`.
    pub fn validate(&self) -> Result<()> {
        let segments: Vec<&str> = self.name.splitn(3, '.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidRepository(self.name.clone()));
        }

        let url = Url::parse(&self.url)
            .map_err(|_| ConfigError::InvalidRepositoryUrl(self.url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::InvalidRepositoryUrl(self.url.clone()));
        }
        if self.kind == RepositoryKind::Rpm && !url.path().ends_with("/repodata/repomd.xml") {
            return Err(ConfigError::InvalidRpmIndexUrl(self.url.clone()));
        }
        Ok(())
    }
}

const APT_RELEASES: [(&str, &str); 3] = [("u24", "noble"), ("u22", "jammy"), ("d12", "bookworm")];
const APT_ARCHES: [(&str, &str); 2] = [("amd", "amd64"), ("arm", "arm64")];
const YUM_RELEASES: [(&str, &str); 2] = [("el8", "8"), ("el9", "9")];
const YUM_ARCHES: [(&str, &str); 2] = [("amd", "x86_64"), ("arm", "aarch64")];
const PG_MAJORS: [u16; 5] = [17, 16, 15, 14, 13];

const PGDG_APT: &str = "https://download.postgresql.org/pub/repos/apt";
const PGDG_YUM: &str = "https://download.postgresql.org/pub/repos/yum";
const PIGSTY_APT: &str = "https://repo.pigsty.io/apt/pgsql";
const PIGSTY_YUM: &str = "https://repo.pigsty.io/yum/pgsql";

/// Builds the built-in repository list: PGDG and PIGSTY for every supported
/// Debian/Ubuntu release and architecture, plus PIGSTY, PGDG and the x86_64-only
/// PGDG non-free YUM repositories for EL8/EL9.
pub fn default_repositories() -> Vec<Repository> {
    let mut repositories = Vec::new();

    for (os, codename) in APT_RELEASES {
        for (alias, deb_arch) in APT_ARCHES {
            repositories.push(Repository::new(
                format!("{os}.{alias}.pgdg"),
                format!("{PGDG_APT}/dists/{codename}-pgdg/main/binary-{deb_arch}/Packages"),
                RepositoryKind::Deb,
            ));
            repositories.push(Repository::new(
                format!("{os}.{alias}.pigsty"),
                format!(
                    "{PIGSTY_APT}/{codename}/dists/{codename}/main/binary-{deb_arch}/Packages"
                ),
                RepositoryKind::Deb,
            ));
        }
    }

    for (os, release) in YUM_RELEASES {
        for (alias, rpm_arch) in YUM_ARCHES {
            repositories.push(Repository::new(
                format!("{os}.{alias}.pigsty"),
                format!("{PIGSTY_YUM}/{os}.{rpm_arch}/repodata/repomd.xml"),
                RepositoryKind::Rpm,
            ));
            for pg in PG_MAJORS {
                repositories.push(Repository::new(
                    format!("{os}.{alias}.pgdg{pg}"),
                    format!(
                        "{PGDG_YUM}/{pg}/redhat/rhel-{release}-{rpm_arch}/repodata/repomd.xml"
                    ),
                    RepositoryKind::Rpm,
                ));
            }
            if rpm_arch == "x86_64" {
                for pg in PG_MAJORS {
                    repositories.push(Repository::new(
                        format!("{os}.{alias}.pgnf{pg}"),
                        format!(
                            "{PGDG_YUM}/non-free/{pg}/redhat/rhel-{release}-{rpm_arch}/repodata/repomd.xml"
                        ),
                        RepositoryKind::Rpm,
                    ));
                }
            }
        }
    }

    repositories
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_repositories_shape() {
        let repos = default_repositories();
        let deb = repos.iter().filter(|r| r.kind == RepositoryKind::Deb).count();
        let rpm = repos.iter().filter(|r| r.kind == RepositoryKind::Rpm).count();

        assert_eq!(deb, 12);
        // pigsty + 5 pgdg per (os, arch), 5 non-free per os on x86_64
        assert_eq!(rpm, 2 * 2 * 6 + 2 * 5);

        let names: HashSet<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), repos.len());
        assert!(repos.iter().all(|r| r.validate().is_ok()));
        assert!(!names.contains("el9.arm.pgnf17"));
    }

    #[test]
    fn test_default_repository_urls() {
        let repos = default_repositories();
        let find = |name: &str| repos.iter().find(|r| r.name == name).unwrap();

        assert_eq!(
            find("d12.arm.pgdg").url,
            "https://download.postgresql.org/pub/repos/apt/dists/bookworm-pgdg/main/binary-arm64/Packages"
        );
        assert_eq!(
            find("u22.amd.pigsty").url,
            "https://repo.pigsty.io/apt/pgsql/jammy/dists/jammy/main/binary-amd64/Packages"
        );
        assert_eq!(
            find("el9.arm.pgdg15").url,
            "https://download.postgresql.org/pub/repos/yum/15/redhat/rhel-9-aarch64/repodata/repomd.xml"
        );
        assert_eq!(
            find("el8.amd.pgnf13").url,
            "https://download.postgresql.org/pub/repos/yum/non-free/13/redhat/rhel-8-x86_64/repodata/repomd.xml"
        );
    }

    #[test]
    fn test_name_segments() {
        let repo = Repository::new("el8.amd.pgnf16", "https://x/repomd.xml", RepositoryKind::Rpm);
        assert_eq!(repo.os_code(), "el8");
        assert_eq!(repo.arch_alias(), "amd");
        assert_eq!(repo.origin_tag(), "pgnf16");
    }

    #[test]
    fn test_validate_rejects_bad_names_and_urls() {
        let bad_name = Repository::new("pgdg", "https://x", RepositoryKind::Deb);
        assert!(matches!(
            bad_name.validate(),
            Err(ConfigError::InvalidRepository(_))
        ));

        let empty_segment = Repository::new("u24..pgdg", "https://x", RepositoryKind::Deb);
        assert!(empty_segment.validate().is_err());

        let bad_url = Repository::new("u24.amd.pgdg", "ftp://x", RepositoryKind::Deb);
        assert!(matches!(
            bad_url.validate(),
            Err(ConfigError::InvalidRepositoryUrl(_))
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_urls() {
        for url in [
            "https://",
            "file:///srv/apt/Packages",
            "https//repo.pigsty.io/Packages",
            "repo.pigsty.io",
        ] {
            let repo = Repository::new("u24.amd.pgdg", url, RepositoryKind::Deb);
            assert!(
                matches!(repo.validate(), Err(ConfigError::InvalidRepositoryUrl(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_validate_requires_rpm_index_path() {
        let root = Repository::new(
            "el9.amd.pigsty",
            "https://repo.pigsty.io/yum/pgsql/el9.x86_64/",
            RepositoryKind::Rpm,
        );
        assert!(matches!(
            root.validate(),
            Err(ConfigError::InvalidRpmIndexUrl(_))
        ));

        let bare = Repository::new("el9.amd.pigsty", "https://x/repomd.xml", RepositoryKind::Rpm);
        assert!(bare.validate().is_err());

        let index = Repository::new(
            "el9.amd.pigsty",
            "https://repo.pigsty.io/yum/pgsql/el9.x86_64/repodata/repomd.xml",
            RepositoryKind::Rpm,
        );
        assert!(index.validate().is_ok());
    }
}
