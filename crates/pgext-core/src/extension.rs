//! Extension catalog records.

use pgext_utils::string::parse_array;
use serde::{Deserialize, Deserializer, Serialize};

/// A PostgreSQL extension as listed in `extension.csv`.
///
/// Array columns use PostgreSQL array literals (`{a,b}`), booleans are `t` /
/// `f`, and empty cells become `None` or empty lists.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Extension {
    pub id: i64,
    pub name: String,
    pub pkg: String,
    pub lead_ext: Option<String>,
    pub category: String,
    pub state: Option<String>,
    pub url: Option<String>,
    pub license: Option<String>,
    #[serde(deserialize_with = "de_array")]
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub repo: Option<String>,
    pub lang: Option<String>,
    #[serde(deserialize_with = "de_flag")]
    pub contrib: bool,
    #[serde(deserialize_with = "de_flag")]
    pub lead: bool,
    #[serde(deserialize_with = "de_flag")]
    pub has_bin: bool,
    #[serde(deserialize_with = "de_flag")]
    pub has_lib: bool,
    #[serde(deserialize_with = "de_flag")]
    pub need_ddl: bool,
    #[serde(deserialize_with = "de_flag")]
    pub need_load: bool,
    #[serde(deserialize_with = "de_flag")]
    pub trusted: bool,
    #[serde(deserialize_with = "de_flag")]
    pub relocatable: bool,
    #[serde(deserialize_with = "de_array")]
    pub schemas: Vec<String>,
    #[serde(deserialize_with = "de_versions")]
    pub pg_ver: Vec<u16>,
    #[serde(deserialize_with = "de_array")]
    pub requires: Vec<String>,
    #[serde(deserialize_with = "de_array")]
    pub require_by: Vec<String>,
    #[serde(deserialize_with = "de_array")]
    pub see_also: Vec<String>,
    pub rpm_ver: Option<String>,
    pub rpm_repo: Option<String>,
    pub rpm_pkg: Option<String>,
    #[serde(deserialize_with = "de_versions")]
    pub rpm_pg: Vec<u16>,
    #[serde(deserialize_with = "de_array")]
    pub rpm_deps: Vec<String>,
    pub deb_ver: Option<String>,
    pub deb_repo: Option<String>,
    pub deb_pkg: Option<String>,
    #[serde(deserialize_with = "de_array")]
    pub deb_deps: Vec<String>,
    #[serde(deserialize_with = "de_versions")]
    pub deb_pg: Vec<u16>,
    pub source: Option<String>,
    pub extra: Option<String>,
    pub en_desc: Option<String>,
    pub zh_desc: Option<String>,
    pub comment: Option<String>,
    pub mtime: Option<String>,
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(|v| v.trim().to_lowercase()).as_deref(),
        Some("t" | "true" | "1" | "yes")
    ))
}

fn de_array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(parse_array).unwrap_or_default())
}

fn de_versions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u16>, D::Error> {
    let items = de_array(deserializer)?;
    Ok(items.iter().filter_map(|v| v.trim().parse().ok()).collect())
}
