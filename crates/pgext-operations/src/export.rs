//! Per-extension JSON documents.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use pgext_core::{
    catalog::{normalize_license, save_packages_csv, Catalog},
    Extension, Grid, MatrixCell, PackageRecord,
};
use pgext_db::{repository::PackageRepository, DbError};
use pgext_utils::fs::{ensure_dir_exists, write_file};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    matrix::all_group_matrices,
    types::{ExportReport, FailedExport, GroupMatrix},
    PgextContext,
};

#[derive(Serialize)]
struct ExtensionDocument<'a> {
    #[serde(flatten)]
    extension: Extension,
    siblings: &'a [String],
    matrix: &'a [MatrixCell],
    package: &'a [PackageRecord],
}

/// Fills the derived columns: canonical license, lead extension and
/// `require_by` from the inverted `requires` lists.
fn enrich(
    ext: &Extension,
    leads: &HashMap<String, String>,
    reverse: &BTreeMap<String, Vec<String>>,
) -> Extension {
    let mut ext = ext.clone();
    ext.license = ext.license.as_deref().map(|l| normalize_license(l).to_string());
    if ext.lead_ext.is_none() {
        ext.lead_ext = leads.get(&ext.pkg).cloned();
    }
    if ext.require_by.is_empty() {
        ext.require_by = reverse.get(&ext.name).cloned().unwrap_or_default();
    }
    ext
}

fn render(ext: Extension, group: Option<&GroupMatrix>) -> serde_json::Result<Vec<u8>> {
    let (siblings, matrix, package) = match group {
        Some(group) => {
            (
                group.siblings.as_slice(),
                group.matrix.cells.as_slice(),
                group.matrix.packages.as_slice(),
            )
        }
        None => (&[][..], &[][..], &[][..]),
    };
    serde_json::to_vec_pretty(&ExtensionDocument {
        extension: ext,
        siblings,
        matrix,
        package,
    })
}

/// Writes `<output>/<extension>.json` for every catalog extension.
pub fn export_documents(
    catalog: &Catalog,
    records: &[PackageRecord],
    grid: &Grid,
    output: &Path,
) -> Result<ExportReport> {
    ensure_dir_exists(output)?;

    let matrices: HashMap<String, GroupMatrix> = all_group_matrices(catalog, records, grid)
        .into_iter()
        .map(|group| (group.matrix.pkg.clone(), group))
        .collect();
    let leads = catalog.leading_map();
    let reverse = catalog.reverse_dependencies();

    let results: Vec<(String, std::result::Result<(), String>)> = catalog
        .extensions()
        .par_iter()
        .map(|ext| {
            let path = output.join(format!("{}.json", ext.name));
            let result = render(enrich(ext, &leads, &reverse), matrices.get(&ext.pkg))
                .map_err(|err| err.to_string())
                .and_then(|bytes| write_file(&path, &bytes).map_err(|err| err.to_string()));
            (ext.name.clone(), result)
        })
        .collect();

    let mut report = ExportReport::default();
    for (extension, result) in results {
        match result {
            Ok(()) => report.written += 1,
            Err(error) => {
                warn!("failed to export {extension}: {error}");
                report.failed.push(FailedExport { extension, error });
            }
        }
    }
    debug!(written = report.written, failed = report.failed.len(), "export done");
    Ok(report)
}

/// Exports every extension of the configured catalog into `output_path`.
pub fn export_catalog(ctx: &PgextContext) -> Result<ExportReport> {
    let catalog = ctx.load_catalog()?;
    let records = ctx.load_records()?;
    let output = ctx.config().get_output_path()?;

    let report = export_documents(&catalog, &records, &ctx.grid(), &output)?;
    info!(
        "exported {} extensions to {}",
        report.written,
        output.display()
    );
    Ok(report)
}

/// Writes the `package` table of the store as CSV, to `output` or to
/// `<data_path>/package.csv`. Returns the path written and the row count.
pub fn dump_packages(ctx: &PgextContext, output: Option<&Path>) -> Result<(PathBuf, usize)> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => ctx.config().get_data_path()?.join("package.csv"),
    };
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let mut db = ctx.open_db()?;
    let mut records: Vec<PackageRecord> = PackageRepository::list_all(db.conn())
        .map_err(DbError::from)?
        .into_iter()
        .map(PackageRecord::from)
        .collect();
    records.sort_by(|a, b| (&a.repo, &a.name, &a.pg).cmp(&(&b.repo, &b.name, &b.pg)));

    save_packages_csv(&path, &records)?;
    info!("dumped {} packages to {}", records.len(), path.display());
    Ok((path, records.len()))
}
