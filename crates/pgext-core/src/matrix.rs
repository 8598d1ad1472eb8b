//! Availability matrix construction.
//!
//! For one package group the matrix has exactly one cell per
//! (OS code, architecture, PG major) in the [`Grid`]; cells without a
//! matching package are explicit `missing` cells.

use std::collections::{BTreeSet, HashMap};

use pgext_config::{config::Config, repository::RepositoryKind};
use pgext_utils::string::split_words;
use serde::Serialize;

use crate::{
    arch::{normalize_arch, Arch, Origin, Platform},
    extension::Extension,
    package::PackageRecord,
    version::extract_semantic_version,
};

/// The OS × architecture × PG major grid every matrix is built over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub os: Vec<String>,
    pub arch: Vec<Arch>,
    pub pg: Vec<u16>,
}

impl Grid {
    pub fn new(os: Vec<String>, arch: Vec<Arch>, pg: Vec<u16>) -> Self {
        Self { os, arch, pg }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut arch: Vec<Arch> = Vec::new();
        for raw in &config.arch {
            let a = normalize_arch(raw);
            if !arch.contains(&a) {
                arch.push(a);
            }
        }
        Self {
            os: config.os.clone(),
            arch,
            pg: config.pg_versions.clone(),
        }
    }

    /// Platforms in OS-major order: `el8.x86_64`, `el8.aarch64`, `el9.x86_64`, ...
    pub fn platforms(&self) -> Vec<Platform> {
        self.os
            .iter()
            .flat_map(|os| self.arch.iter().map(move |arch| Platform::new(os.clone(), *arch)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.os.len() * self.arch.len() * self.pg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Available,
    Warning,
    Missing,
    Hidden,
}

impl CellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellStatus::Available => "available",
            CellStatus::Warning => "warning",
            CellStatus::Missing => "missing",
            CellStatus::Hidden => "hidden",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatrixCell {
    pub os: String,
    pub arch: Arch,
    pub pg: u16,
    pub status: CellStatus,
    /// Origin of the winning package, `CONTRIB` for contrib extensions.
    pub origin: Option<Origin>,
    /// Semantic version of the winning package.
    pub version: Option<String>,
    pub package: Option<String>,
    pub repo: Option<String>,
    /// Number of package records competing for this cell.
    pub count: usize,
}

impl MatrixCell {
    fn empty(platform: &Platform, pg: u16, status: CellStatus) -> Self {
        Self {
            os: platform.os.clone(),
            arch: platform.arch,
            pg,
            status,
            origin: None,
            version: None,
            package: None,
            repo: None,
            count: 0,
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::new(self.os.clone(), self.arch)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AvailabilityMatrix {
    pub pkg: String,
    pub contrib: bool,
    pub cells: Vec<MatrixCell>,
    /// Every package record that matched this group somewhere in the grid.
    #[serde(skip)]
    pub packages: Vec<PackageRecord>,
}

impl AvailabilityMatrix {
    pub fn get(&self, os: &str, arch: Arch, pg: u16) -> Option<&MatrixCell> {
        self.cells
            .iter()
            .find(|c| c.os == os && c.arch == arch && c.pg == pg)
    }

    /// Cells grouped by platform, in grid order.
    pub fn rows(&self) -> Vec<(Platform, Vec<&MatrixCell>)> {
        let mut rows: Vec<(Platform, Vec<&MatrixCell>)> = Vec::new();
        for cell in &self.cells {
            let platform = cell.platform();
            match rows.last_mut() {
                Some((last, cells)) if *last == platform => cells.push(cell),
                _ => rows.push((platform, vec![cell])),
            }
        }
        rows
    }

    pub fn count(&self, status: CellStatus) -> usize {
        self.cells.iter().filter(|c| c.status == status).count()
    }

    /// Cells that are not plainly available.
    pub fn problems(&self) -> impl Iterator<Item = &MatrixCell> {
        self.cells
            .iter()
            .filter(|c| c.status != CellStatus::Available)
    }
}

/// The parts of a package group's leading extension the builder needs.
#[derive(Clone, Debug)]
pub struct MatrixInput<'a> {
    pub pkg: &'a str,
    pub pg_ver: &'a [u16],
    pub contrib: bool,
    pub version: Option<&'a str>,
    pub rpm_pkg: Option<&'a str>,
    pub deb_pkg: Option<&'a str>,
}

impl<'a> From<&'a Extension> for MatrixInput<'a> {
    fn from(ext: &'a Extension) -> Self {
        Self {
            pkg: &ext.pkg,
            pg_ver: &ext.pg_ver,
            contrib: ext.contrib,
            version: ext.version.as_deref(),
            rpm_pkg: ext.rpm_pkg.as_deref(),
            deb_pkg: ext.deb_pkg.as_deref(),
        }
    }
}

/// An `rpm_pkg`/`deb_pkg` pattern with `$v` expanded.
struct PackageGlob {
    pattern: String,
    pg: Option<u16>,
    kind: RepositoryKind,
}

/// Decides whether a package name belongs to the group at a PG major.
///
/// Names are matched exactly, as `<pkg>_<pg>` (RPM) or as
/// `postgresql-<pg>-<pkg>` (Debian, underscores as dashes), and against the
/// extension's `rpm_pkg`/`deb_pkg` glob patterns with `$v` replaced by the
/// PG major. `rpm_pkg` patterns only apply on EL platforms and `deb_pkg`
/// patterns only on Debian and Ubuntu.
struct PackageMatcher {
    names: HashMap<String, Option<u16>>,
    globs: Vec<PackageGlob>,
}

impl PackageMatcher {
    fn new(input: &MatrixInput<'_>, pg_versions: &[u16]) -> Self {
        let mut names = HashMap::new();
        let mut globs = Vec::new();
        let deb_name = input.pkg.replace('_', "-");

        names.insert(input.pkg.to_string(), None);
        for &pg in pg_versions {
            names.insert(format!("{}_{pg}", input.pkg), Some(pg));
            names.insert(format!("postgresql-{pg}-{deb_name}"), Some(pg));
        }

        let patterns = [
            (RepositoryKind::Rpm, input.rpm_pkg),
            (RepositoryKind::Deb, input.deb_pkg),
        ];
        for (kind, raw) in patterns {
            for pattern in raw.into_iter().flat_map(split_words) {
                if pattern.contains("$v") {
                    for &pg in pg_versions {
                        globs.push(PackageGlob {
                            pattern: pattern.replace("$v", &pg.to_string()),
                            pg: Some(pg),
                            kind,
                        });
                    }
                } else {
                    globs.push(PackageGlob {
                        pattern,
                        pg: None,
                        kind,
                    });
                }
            }
        }

        Self { names, globs }
    }

    fn matches_with(&self, name: &str, pg: u16, kind: impl Fn(RepositoryKind) -> bool) -> bool {
        if let Some(expected) = self.names.get(name) {
            return expected.map_or(true, |p| p == pg);
        }
        self.globs.iter().any(|glob| {
            kind(glob.kind)
                && glob.pg.map_or(true, |p| p == pg)
                && fast_glob::glob_match(&glob.pattern, name)
        })
    }

    fn matches(&self, name: &str, pg: u16, platform: &Platform) -> bool {
        let platform_kind = platform.package_kind();
        self.matches_with(name, pg, |kind| Some(kind) == platform_kind)
    }

    /// Platform-independent pre-filter over every PG major.
    fn matches_any(&self, name: &str, pg_versions: &[u16]) -> bool {
        pg_versions
            .iter()
            .any(|&pg| self.matches_with(name, pg, |_| true))
    }
}

fn cell_status(record: &PackageRecord) -> CellStatus {
    if record.hide {
        CellStatus::Hidden
    } else if record.miss {
        CellStatus::Missing
    } else if record.warn {
        CellStatus::Warning
    } else {
        CellStatus::Available
    }
}

fn contrib_cell(input: &MatrixInput<'_>, platform: &Platform, pg: u16) -> MatrixCell {
    if !input.pg_ver.contains(&pg) {
        return MatrixCell::empty(platform, pg, CellStatus::Missing);
    }
    MatrixCell {
        origin: Some(Origin::Contrib),
        version: input.version.map(String::from),
        ..MatrixCell::empty(platform, pg, CellStatus::Available)
    }
}

/// Builds the availability matrix of one package group over `grid`.
///
/// When several records compete for a cell, the highest-ranked [`Origin`]
/// wins, then the record that appears last in `records`.
pub fn build_matrix(
    input: &MatrixInput<'_>,
    records: &[PackageRecord],
    grid: &Grid,
) -> AvailabilityMatrix {
    let platforms = grid.platforms();
    let mut cells = Vec::with_capacity(grid.len());
    let mut matched: BTreeSet<usize> = BTreeSet::new();

    if input.contrib {
        for platform in &platforms {
            for &pg in &grid.pg {
                cells.push(contrib_cell(input, platform, pg));
            }
        }
        return AvailabilityMatrix {
            pkg: input.pkg.to_string(),
            contrib: true,
            cells,
            packages: Vec::new(),
        };
    }

    let matcher = PackageMatcher::new(input, &grid.pg);
    let relevant: Vec<(usize, &PackageRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matcher.matches_any(&r.name, &grid.pg))
        .collect();

    for platform in &platforms {
        let local: Vec<&(usize, &PackageRecord)> = relevant
            .iter()
            .filter(|(_, r)| r.os_code == platform.os && r.arch == platform.arch)
            .collect();

        for &pg in &grid.pg {
            let candidates: Vec<&(usize, &PackageRecord)> = local
                .iter()
                .copied()
                .filter(|(_, r)| {
                    r.pg.map_or(true, |p| p == pg) && matcher.matches(&r.name, pg, platform)
                })
                .collect();
            matched.extend(candidates.iter().map(|(i, _)| *i));

            let winner = candidates
                .iter()
                .max_by_key(|(i, r)| (r.origin.rank(), *i));
            let cell = match winner {
                Some((_, record)) => {
                    MatrixCell {
                        origin: Some(record.origin),
                        version: Some(extract_semantic_version(&record.version)),
                        package: Some(record.name.clone()),
                        repo: Some(record.repo.clone()),
                        count: candidates.len(),
                        ..MatrixCell::empty(platform, pg, cell_status(record))
                    }
                }
                None => MatrixCell::empty(platform, pg, CellStatus::Missing),
            };
            cells.push(cell);
        }
    }

    AvailabilityMatrix {
        pkg: input.pkg.to_string(),
        contrib: false,
        cells,
        packages: matched.into_iter().map(|i| records[i].clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(
            ["el8", "el9", "d12", "u22", "u24"]
                .map(String::from)
                .to_vec(),
            vec![Arch::X86_64, Arch::Aarch64],
            vec![17, 16, 15, 14, 13],
        )
    }

    fn input<'a>(pkg: &'a str, pg_ver: &'a [u16], contrib: bool) -> MatrixInput<'a> {
        MatrixInput {
            pkg,
            pg_ver,
            contrib,
            version: Some("1.0"),
            rpm_pkg: None,
            deb_pkg: None,
        }
    }

    fn record(name: &str, os: &str, arch: Arch, pg: Option<u16>, origin: Origin) -> PackageRecord {
        PackageRecord {
            repo: format!("{os}.{}.{}", arch.alias(), origin.as_str().to_lowercase()),
            name: name.to_string(),
            os_code: os.to_string(),
            arch,
            pg,
            origin,
            version: "0.8.0-1.el9".to_string(),
            release: None,
            file: None,
            url: None,
            sha256: None,
            size: 0,
            miss: false,
            hide: false,
            warn: false,
        }
    }

    #[test]
    fn test_contrib_uses_pg_ver_only() {
        let records = vec![record("postgres_fdw", "el9", Arch::X86_64, Some(17), Origin::Pgdg)];
        let matrix = build_matrix(&input("postgres_fdw", &[14, 15], true), &records, &grid());

        assert_eq!(matrix.cells.len(), 50);
        for cell in &matrix.cells {
            let expected = if [14, 15].contains(&cell.pg) {
                CellStatus::Available
            } else {
                CellStatus::Missing
            };
            assert_eq!(cell.status, expected, "{}.{} pg{}", cell.os, cell.arch, cell.pg);
        }
        assert!(matrix.packages.is_empty());
    }

    #[test]
    fn test_no_records_all_missing() {
        let matrix = build_matrix(&input("pgvector", &[17, 16], false), &[], &grid());
        assert_eq!(matrix.cells.len(), grid().len());
        assert!(matrix.cells.iter().all(|c| c.status == CellStatus::Missing));
        assert_eq!(matrix.count(CellStatus::Missing), 50);
    }

    #[test]
    fn test_alias_matching() {
        let records = vec![
            record("pgvector_17", "el9", Arch::X86_64, Some(17), Origin::Pgdg),
            record("postgresql-16-pgvector", "u24", Arch::Aarch64, Some(16), Origin::Pgdg),
            record("pgvector", "d12", Arch::X86_64, None, Origin::Pigsty),
            record("pgvector_17", "el8", Arch::X86_64, Some(16), Origin::Pgdg),
            record("other_17", "el9", Arch::X86_64, Some(17), Origin::Pgdg),
        ];
        let matrix = build_matrix(&input("pgvector", &[17, 16], false), &records, &grid());

        let cell = matrix.get("el9", Arch::X86_64, 17).unwrap();
        assert_eq!(cell.status, CellStatus::Available);
        assert_eq!(cell.origin, Some(Origin::Pgdg));
        assert_eq!(cell.version.as_deref(), Some("0.8.0"));
        assert_eq!(matrix.get("el9", Arch::X86_64, 16).unwrap().status, CellStatus::Missing);

        assert_eq!(matrix.get("u24", Arch::Aarch64, 16).unwrap().status, CellStatus::Available);
        assert_eq!(matrix.get("u24", Arch::X86_64, 16).unwrap().status, CellStatus::Missing);

        // version-independent package fills every PG column of its platform
        for pg in [17, 16, 15, 14, 13] {
            assert_eq!(matrix.get("d12", Arch::X86_64, pg).unwrap().status, CellStatus::Available);
        }

        // pg parsed from the record disagrees with the alias
        assert_eq!(matrix.get("el8", Arch::X86_64, 17).unwrap().status, CellStatus::Missing);
        assert_eq!(matrix.packages.len(), 3);
    }

    #[test]
    fn test_debian_alias_uses_dashes() {
        let records = vec![record("postgresql-17-pg-cron", "u22", Arch::X86_64, Some(17), Origin::Pgdg)];
        let matrix = build_matrix(&input("pg_cron", &[17], false), &records, &grid());
        assert_eq!(matrix.get("u22", Arch::X86_64, 17).unwrap().status, CellStatus::Available);
    }

    #[test]
    fn test_glob_patterns() {
        let records = vec![
            record("timescaledb-2-postgresql-17", "u24", Arch::X86_64, None, Origin::Other),
            record("timescaledb_17-2.17.0", "el9", Arch::X86_64, None, Origin::Pigsty),
        ];
        let mut input = input("timescaledb", &[17], false);
        input.deb_pkg = Some("timescaledb-2-postgresql-$v");
        input.rpm_pkg = Some("timescaledb_$v*");

        let matrix = build_matrix(&input, &records, &grid());
        assert_eq!(matrix.get("u24", Arch::X86_64, 17).unwrap().status, CellStatus::Available);
        assert_eq!(matrix.get("u24", Arch::X86_64, 16).unwrap().status, CellStatus::Missing);
        assert_eq!(matrix.get("el9", Arch::X86_64, 17).unwrap().status, CellStatus::Available);
    }

    #[test]
    fn test_glob_patterns_follow_os_family() {
        let records = vec![
            record("pgvector_17", "el9", Arch::X86_64, Some(17), Origin::Pgdg),
            record("pgvector_17", "u24", Arch::X86_64, Some(17), Origin::Other),
            record("postgresql-17-pgvector", "d12", Arch::X86_64, Some(17), Origin::Pgdg),
            record("postgresql-17-pgvector", "el8", Arch::X86_64, Some(17), Origin::Other),
        ];
        let mut input = input("vector_ext", &[17], false);
        input.rpm_pkg = Some("pgvector_$v");
        input.deb_pkg = Some("postgresql-$v-pgvector");

        let matrix = build_matrix(&input, &records, &grid());
        assert_eq!(matrix.get("el9", Arch::X86_64, 17).unwrap().status, CellStatus::Available);
        assert_eq!(matrix.get("d12", Arch::X86_64, 17).unwrap().status, CellStatus::Available);
        assert_eq!(matrix.get("u24", Arch::X86_64, 17).unwrap().status, CellStatus::Missing);
        assert_eq!(matrix.get("el8", Arch::X86_64, 17).unwrap().status, CellStatus::Missing);
        assert_eq!(matrix.packages.len(), 2);
    }

    #[test]
    fn test_precedence_prefers_pigsty_then_latest() {
        let mut pgdg = record("pgvector_17", "el9", Arch::X86_64, Some(17), Origin::Pgdg);
        pgdg.version = "0.8.1".into();
        let mut pigsty = record("pgvector_17", "el9", Arch::X86_64, Some(17), Origin::Pigsty);
        pigsty.version = "0.8.0".into();
        let mut later_pgdg = pgdg.clone();
        later_pgdg.version = "0.8.2".into();

        let records = vec![pigsty.clone(), pgdg.clone()];
        let matrix = build_matrix(&input("pgvector", &[17], false), &records, &grid());
        let cell = matrix.get("el9", Arch::X86_64, 17).unwrap();
        assert_eq!(cell.origin, Some(Origin::Pigsty));
        assert_eq!(cell.count, 2);

        let records = vec![pgdg, later_pgdg];
        let matrix = build_matrix(&input("pgvector", &[17], false), &records, &grid());
        let cell = matrix.get("el9", Arch::X86_64, 17).unwrap();
        assert_eq!(cell.version.as_deref(), Some("0.8.2"));
    }

    #[test]
    fn test_flags() {
        let mut hidden = record("a_17", "el8", Arch::X86_64, Some(17), Origin::Pigsty);
        hidden.hide = true;
        hidden.warn = true;
        let mut missing = record("a_16", "el8", Arch::X86_64, Some(16), Origin::Pigsty);
        missing.miss = true;
        let mut warned = record("a_15", "el8", Arch::X86_64, Some(15), Origin::Pigsty);
        warned.warn = true;

        let matrix = build_matrix(&input("a", &[17, 16, 15], false), &[hidden, missing, warned], &grid());
        assert_eq!(matrix.get("el8", Arch::X86_64, 17).unwrap().status, CellStatus::Hidden);
        assert_eq!(matrix.get("el8", Arch::X86_64, 16).unwrap().status, CellStatus::Missing);
        assert_eq!(matrix.get("el8", Arch::X86_64, 15).unwrap().status, CellStatus::Warning);
        assert_eq!(matrix.problems().count(), 50);
    }

    #[test]
    fn test_rows_follow_grid_order() {
        let matrix = build_matrix(&input("x", &[], false), &[], &grid());
        let rows = matrix.rows();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].0.to_string(), "el8.x86_64");
        assert_eq!(rows[1].0.to_string(), "el8.aarch64");
        assert_eq!(rows[9].0.to_string(), "u24.aarch64");
        assert!(rows.iter().all(|(_, cells)| cells.len() == 5));
    }
}
