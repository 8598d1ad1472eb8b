//! Parsing of YUM `repodata/repomd.xml` indexes.

use serde::Deserialize;
use url::Url;

use crate::error::{RegistryError, Result};

/// Root `<repomd>` element. Only the `<data>` entries are of interest.
#[derive(Debug, Deserialize)]
pub struct RepoMd {
    #[serde(rename = "data", default)]
    pub data: Vec<RepoMdData>,
}

#[derive(Debug, Deserialize)]
pub struct RepoMdData {
    #[serde(rename = "@type")]
    pub kind: String,
    pub location: Location,
    pub checksum: Option<Checksum>,
    #[serde(rename = "open-checksum")]
    pub open_checksum: Option<Checksum>,
    pub size: Option<u64>,
    #[serde(rename = "open-size")]
    pub open_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    #[serde(rename = "@href")]
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub struct Checksum {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "$text")]
    pub value: String,
}

/// Location and expected digest of the primary SQLite database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryDb {
    pub href: String,
    /// SHA-256 of the decompressed database.
    pub sha256: String,
}

impl RepoMd {
    pub fn parse(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml).map_err(|err| RegistryError::Repomd(err.to_string()))
    }

    /// Finds the `primary_db` entry and its sha256 open-checksum.
    pub fn primary_db(&self, url: &str) -> Result<PrimaryDb> {
        let entry = self
            .data
            .iter()
            .find(|d| d.kind == "primary_db")
            .ok_or_else(|| {
                RegistryError::MissingPrimaryDb {
                    url: url.to_string(),
                }
            })?;

        let sha256 = entry
            .open_checksum
            .as_ref()
            .filter(|c| c.kind == "sha256")
            .map(|c| c.value.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RegistryError::MissingChecksum {
                    url: url.to_string(),
                }
            })?;

        Ok(PrimaryDb {
            href: entry.location.href.clone(),
            sha256,
        })
    }
}

/// Resolves `href` against the repository root, i.e. `repomd_url` with its
/// trailing `repodata/repomd.xml` removed.
///
/// URLs that do not end in `/repodata/repomd.xml` are rejected rather than
/// guessed at.
pub fn primary_url(repomd_url: &str, href: &str) -> Result<String> {
    let invalid = || RegistryError::InvalidUrl(repomd_url.to_string());
    let mut base = Url::parse(repomd_url).map_err(|_| invalid())?;
    if base.cannot_be_a_base() {
        return Err(invalid());
    }
    let root = base
        .path()
        .strip_suffix("repodata/repomd.xml")
        .filter(|root| root.ends_with('/'))
        .ok_or_else(invalid)?
        .to_string();
    base.set_path(&root);
    base.set_query(None);
    base.set_fragment(None);

    base.join(href)
        .map(String::from)
        .map_err(|_| RegistryError::InvalidUrl(href.to_string()))
}
