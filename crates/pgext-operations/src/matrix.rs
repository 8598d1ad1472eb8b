//! Availability matrices of catalog package groups.

use pgext_core::{
    build_matrix, catalog::Catalog, Extension, Grid, MatrixInput, PackageRecord,
};
use rayon::prelude::*;
use tracing::debug;

use crate::{error::Result, types::GroupMatrix, PgextContext};

/// Builds the matrix of the package group `ext` belongs to, keyed on the
/// group's leading extension.
pub fn group_matrix(
    catalog: &Catalog,
    ext: &Extension,
    records: &[PackageRecord],
    grid: &Grid,
) -> GroupMatrix {
    let lead = catalog.leading(&ext.pkg).unwrap_or(ext);
    GroupMatrix {
        extension: lead.name.clone(),
        siblings: catalog.siblings(&lead.pkg),
        matrix: build_matrix(&MatrixInput::from(lead), records, grid),
    }
}

/// Matrices of every package group, ordered by package name.
pub fn all_group_matrices(
    catalog: &Catalog,
    records: &[PackageRecord],
    grid: &Grid,
) -> Vec<GroupMatrix> {
    let leads: Vec<&Extension> = catalog
        .groups()
        .into_values()
        .filter_map(|members| members.first().copied())
        .collect();
    debug!(groups = leads.len(), records = records.len(), "building matrices");

    leads
        .into_par_iter()
        .map(|ext| group_matrix(catalog, ext, records, grid))
        .collect()
}

/// Resolves each query to an extension (or package name) and builds its
/// group's matrix. Queries naming the same group yield one matrix.
pub fn query_matrices(ctx: &PgextContext, queries: &[String]) -> Result<Vec<GroupMatrix>> {
    let catalog = ctx.load_catalog()?;
    let records = ctx.load_records()?;
    let grid = ctx.grid();

    let mut matrices: Vec<GroupMatrix> = Vec::with_capacity(queries.len());
    for query in queries {
        let ext = catalog.resolve(query)?;
        if matrices.iter().any(|m| m.matrix.pkg == ext.pkg) {
            continue;
        }
        matrices.push(group_matrix(&catalog, ext, &records, &grid));
    }
    Ok(matrices)
}

#[cfg(test)]
mod tests {
    use pgext_core::{Arch, CellStatus, Origin};

    use super::*;

    fn ext(name: &str, pkg: &str, lead: bool) -> Extension {
        Extension {
            name: name.to_string(),
            pkg: pkg.to_string(),
            lead,
            pg_ver: vec![17, 16, 15, 14, 13],
            version: Some("3.5.0".to_string()),
            ..Default::default()
        }
    }

    fn record(name: &str, pg: Option<u16>) -> PackageRecord {
        PackageRecord {
            repo: "el9.amd.pigsty".to_string(),
            name: name.to_string(),
            os_code: "el9".to_string(),
            arch: Arch::X86_64,
            pg,
            origin: Origin::Pigsty,
            version: "3.5.0-1PIGSTY.el9".to_string(),
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

    fn grid() -> Grid {
        Grid::new(
            vec!["el9".to_string(), "u24".to_string()],
            vec![Arch::X86_64, Arch::Aarch64],
            vec![17, 16],
        )
    }

    #[test]
    fn test_group_matrix_uses_leading_extension() {
        let catalog = Catalog::new(vec![
            ext("postgis_topology", "postgis", false),
            ext("postgis", "postgis", true),
        ]);
        let records = vec![record("postgis_17", Some(17))];

        let group = group_matrix(&catalog, &catalog.extensions()[0], &records, &grid());

        assert_eq!(group.extension, "postgis");
        assert_eq!(group.siblings, vec!["postgis_topology", "postgis"]);
        assert_eq!(group.matrix.cells.len(), 8);
        let cell = group.matrix.get("el9", Arch::X86_64, 17).unwrap();
        assert_eq!(cell.status, CellStatus::Available);
        assert_eq!(cell.version.as_deref(), Some("3.5.0"));
        assert_eq!(
            group.matrix.get("el9", Arch::X86_64, 16).unwrap().status,
            CellStatus::Missing
        );
    }

    #[test]
    fn test_all_group_matrices_one_per_package() {
        let catalog = Catalog::new(vec![
            ext("postgis", "postgis", true),
            ext("postgis_raster", "postgis", false),
            ext("vector", "pgvector", true),
        ]);

        let matrices = all_group_matrices(&catalog, &[], &grid());

        let pkgs: Vec<&str> = matrices.iter().map(|m| m.matrix.pkg.as_str()).collect();
        assert_eq!(pkgs, vec!["pgvector", "postgis"]);
        assert!(matrices
            .iter()
            .all(|m| m.matrix.count(CellStatus::Missing) == 8));
    }
}
