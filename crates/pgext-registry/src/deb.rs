//! Parser for Debian-control `Packages` indexes.
//!
//! A `Packages` file is a sequence of paragraphs separated by blank lines.
//! Each paragraph holds `Key: value` lines; lines starting with whitespace
//! continue the value of the previous key. Well-known keys are mapped onto
//! [`DebPackage`] fields, everything else lands in [`DebPackage::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A single binary package record from an APT `Packages` index.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DebPackage {
    pub package: String,
    pub version: Option<String>,
    pub architecture: Option<String>,
    pub size: i64,
    /// Installed size in bytes (the control file states KiB).
    pub installed_size: i64,
    pub priority: Option<String>,
    pub section: Option<String>,
    pub filename: Option<String>,
    pub sha256: Option<String>,
    pub sha1: Option<String>,
    pub md5sum: Option<String>,
    pub maintainer: Option<String>,
    pub homepage: Option<String>,
    pub depends: Option<String>,
    pub source: Option<String>,
    pub provides: Option<String>,
    pub recommends: Option<String>,
    pub suggests: Option<String>,
    pub conflicts: Option<String>,
    pub breaks: Option<String>,
    pub replaces: Option<String>,
    pub enhances: Option<String>,
    pub pre_depends: Option<String>,
    pub build_ids: Option<String>,
    pub package_type: Option<String>,
    pub auto_built_package: Option<String>,
    pub multi_arch: Option<String>,
    /// Synopsis line followed by the extended description, joined by `\n`.
    pub description: Option<String>,
    /// Fields not covered above, keyed by their original control name.
    pub extra: Map<String, Value>,
}

impl DebPackage {
    fn set_field(&mut self, key: &str, value: String) {
        let slot = match key {
            "Package" => {
                self.package = value;
                return;
            }
            "Size" => {
                self.size = value.trim().parse().unwrap_or(0);
                return;
            }
            "Installed-Size" => {
                self.installed_size = value
                    .trim()
                    .parse::<i64>()
                    .map(|kib| kib.saturating_mul(1024))
                    .unwrap_or(0);
                return;
            }
            "Version" => &mut self.version,
            "Architecture" => &mut self.architecture,
            "Priority" => &mut self.priority,
            "Section" => &mut self.section,
            "Filename" => &mut self.filename,
            "SHA256" => &mut self.sha256,
            "SHA1" => &mut self.sha1,
            "MD5sum" => &mut self.md5sum,
            "Maintainer" => &mut self.maintainer,
            "Homepage" => &mut self.homepage,
            "Depends" => &mut self.depends,
            "Source" => &mut self.source,
            "Provides" => &mut self.provides,
            "Recommends" => &mut self.recommends,
            "Suggests" => &mut self.suggests,
            "Conflicts" => &mut self.conflicts,
            "Breaks" => &mut self.breaks,
            "Replaces" => &mut self.replaces,
            "Enhances" => &mut self.enhances,
            "Pre-Depends" => &mut self.pre_depends,
            "Build-Ids" => &mut self.build_ids,
            "Package-Type" => &mut self.package_type,
            "Auto-Built-Package" => &mut self.auto_built_package,
            "Multi-Arch" => &mut self.multi_arch,
            "Description" => &mut self.description,
            _ => {
                self.extra.insert(key.to_string(), Value::String(value));
                return;
            }
        };
        *slot = Some(value);
    }
}

/// Parses one paragraph. Returns `None` for malformed paragraphs or
/// paragraphs without a `Package` field.
fn parse_record(record: &str) -> Option<DebPackage> {
    let mut fields: Vec<(String, String)> = Vec::new();

    for line in record.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            let (_, value) = fields.last_mut()?;
            value.push('\n');
            value.push_str(line.trim());
            continue;
        }
        let (key, value) = line.split_once(':')?;
        fields.push((key.trim().to_string(), value.trim().to_string()));
    }

    let mut package = DebPackage::default();
    for (key, value) in fields {
        package.set_field(&key, value);
    }
    if package.package.is_empty() {
        return None;
    }
    Some(package)
}

/// Parses a full `Packages` index into package records, in file order.
///
/// Malformed paragraphs are skipped with a warning; they never abort the
/// rest of the file.
pub fn parse_packages(content: &str) -> Vec<DebPackage> {
    let content = content.replace("\r\n", "\n");
    let mut packages = Vec::new();
    let mut skipped = 0usize;

    for record in content.split("\n\n") {
        if record.trim().is_empty() {
            continue;
        }
        match parse_record(record.trim_matches('\n')) {
            Some(package) => packages.push(package),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("skipped {} malformed package record(s)", skipped);
    }
    packages
}
