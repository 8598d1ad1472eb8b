//! Extension catalog and package CSV stores.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use pgext_utils::fs::ensure_dir_exists;
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    extension::Extension,
    package::PackageRecord,
};

const LICENSE_ALIASES: [(&str, &str); 9] = [
    ("BSD-0", "BSD 0-Clause"),
    ("BSD-2", "BSD 2-Clause"),
    ("BSD-3", "BSD 3-Clause"),
    ("GPLv2", "GPL-2.0"),
    ("GPLv3", "GPL-3.0"),
    ("LGPLv2", "LGPL-2.1"),
    ("LGPLv3", "LGPL-3.0"),
    ("AGPLv3", "AGPL-3.0"),
    ("MPLv2", "MPL-2.0"),
];

/// Maps short license spellings to their canonical names. Unknown names are
/// returned unchanged.
pub fn normalize_license(name: &str) -> &str {
    LICENSE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, canonical)| *canonical)
}

fn csv_error(path: &Path, source: csv::Error) -> CoreError {
    CoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}

/// The loaded extension catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    extensions: Vec<Extension>,
}

impl Catalog {
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self { extensions }
    }

    /// Reads `extension.csv`. Rows are kept in file order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
        let extensions = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Extension>, _>>()
            .map_err(|e| csv_error(path, e))?;
        debug!("loaded {} extensions from {}", extensions.len(), path.display());
        Ok(Self { extensions })
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name == name)
    }

    /// Finds an extension by name, falling back to the leading extension of
    /// a package with that name.
    pub fn resolve(&self, query: &str) -> Result<&Extension> {
        self.get(query)
            .or_else(|| self.leading(query))
            .ok_or_else(|| CoreError::ExtensionNotFound(query.to_string()))
    }

    /// Extensions grouped by package name, ordered by package name.
    pub fn groups(&self) -> BTreeMap<&str, Vec<&Extension>> {
        let mut groups: BTreeMap<&str, Vec<&Extension>> = BTreeMap::new();
        for ext in &self.extensions {
            if !ext.pkg.is_empty() {
                groups.entry(ext.pkg.as_str()).or_default().push(ext);
            }
        }
        groups
    }

    /// The group's extension flagged `lead`, or its first member.
    pub fn leading(&self, pkg: &str) -> Option<&Extension> {
        let mut members = self.extensions.iter().filter(|e| e.pkg == pkg);
        let first = members.next()?;
        if first.lead {
            return Some(first);
        }
        Some(members.find(|e| e.lead).unwrap_or(first))
    }

    /// `pkg -> leading extension name` for every package with a lead.
    pub fn leading_map(&self) -> HashMap<String, String> {
        self.extensions
            .iter()
            .filter(|e| e.lead && !e.pkg.is_empty())
            .map(|e| (e.pkg.clone(), e.name.clone()))
            .collect()
    }

    pub fn siblings(&self, pkg: &str) -> Vec<String> {
        self.extensions
            .iter()
            .filter(|e| e.pkg == pkg)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Inverts `requires`: extension name -> names of extensions requiring it.
    pub fn reverse_dependencies(&self) -> BTreeMap<String, Vec<String>> {
        let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for ext in &self.extensions {
            for dep in &ext.requires {
                let dependents = reverse.entry(dep.clone()).or_default();
                if !dependents.contains(&ext.name) {
                    dependents.push(ext.name.clone());
                }
            }
        }
        reverse
    }
}

/// Loads package records from a CSV store.
pub fn load_packages_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PackageRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<PackageRecord>, _>>()
        .map_err(|e| csv_error(path, e))
}

/// Writes package records to a CSV store, replacing the file.
pub fn save_packages_csv<P: AsRef<Path>>(path: P, records: &[PackageRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|source| {
        CoreError::IoError {
            action: format!("writing {}", path.display()),
            source,
        }
    })?;
    Ok(())
}
