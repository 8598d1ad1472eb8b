//! Per-platform availability gaps.

use pgext_core::{catalog::Catalog, Grid, PackageRecord};

use crate::{
    error::Result,
    matrix::all_group_matrices,
    types::{GapEntry, PlatformGaps},
    PgextContext,
};

/// Lists, for every platform of `grid`, the non-contrib package groups with
/// at least one missing, warning or hidden cell.
pub fn find_gaps(catalog: &Catalog, records: &[PackageRecord], grid: &Grid) -> Vec<PlatformGaps> {
    let groups: Vec<_> = all_group_matrices(catalog, records, grid)
        .into_iter()
        .filter(|group| !group.matrix.contrib)
        .collect();

    grid.platforms()
        .into_iter()
        .map(|platform| {
            let entries = groups
                .iter()
                .filter_map(|group| {
                    let cells: Vec<_> = group
                        .matrix
                        .problems()
                        .filter(|cell| cell.os == platform.os && cell.arch == platform.arch)
                        .map(|cell| (cell.pg, cell.status))
                        .collect();
                    (!cells.is_empty()).then(|| {
                        GapEntry {
                            pkg: group.matrix.pkg.clone(),
                            extension: group.extension.clone(),
                            cells,
                        }
                    })
                })
                .collect();
            PlatformGaps { platform, entries }
        })
        .collect()
}

pub fn catalog_gaps(ctx: &PgextContext) -> Result<Vec<PlatformGaps>> {
    let catalog = ctx.load_catalog()?;
    let records = ctx.load_records()?;
    Ok(find_gaps(&catalog, &records, &ctx.grid()))
}
