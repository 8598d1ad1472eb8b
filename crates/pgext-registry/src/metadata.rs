//! Conditional fetching of repository metadata.
//!
//! One repository is handled at a time:
//! 1. a conditional HEAD against the index URL decides whether anything
//!    changed since the stored validators were recorded;
//! 2. deb repositories download the `Packages` index itself;
//! 3. rpm repositories download `repomd.xml`, then the primary database it
//!    references, which is decompressed and checked against the declared
//!    SHA-256 before it is accepted.

use std::time::Duration;

use pgext_config::repository::{Repository, RepositoryKind};
use pgext_dl::{DownloadError, Transport, Validators};
use pgext_utils::hash::{sha256_hex, verify_sha256};
use tracing::{debug, info};

use crate::{
    compression::decompress,
    deb::{parse_packages, DebPackage},
    error::{RegistryError, Result},
    repomd::{primary_url, RepoMd},
    rpm::{read_primary_db, RpmPackage},
};

#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Timeout for HEAD requests and index downloads.
    pub metadata_timeout: Duration,
    /// Timeout for RPM primary database downloads.
    pub payload_timeout: Duration,
    /// Ignore stored validators and always download.
    pub force: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            metadata_timeout: Duration::from_secs(30),
            payload_timeout: Duration::from_secs(120),
            force: false,
        }
    }
}

/// Parsed package records of one repository.
#[derive(Clone, Debug)]
pub enum MetadataContent {
    Deb(Vec<DebPackage>),
    Rpm(Vec<RpmPackage>),
}

impl MetadataContent {
    pub fn len(&self) -> usize {
        match self {
            MetadataContent::Deb(packages) => packages.len(),
            MetadataContent::Rpm(packages) => packages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Freshly downloaded and verified metadata.
#[derive(Clone, Debug)]
pub struct RepoPayload {
    /// Raw `Packages` bytes, or the decompressed primary database.
    pub data: Vec<u8>,
    /// Validators of the index URL, to be stored for the next run.
    pub validators: Validators,
    pub content: MetadataContent,
}

#[derive(Clone, Debug)]
pub enum FetchOutcome {
    /// The server answered 304 Not Modified.
    NotModified,
    /// Remote size and ETag equal the stored ones.
    Unchanged,
    Fetched(RepoPayload),
}

/// Parses stored metadata bytes of the given repository kind.
pub fn parse_payload(kind: RepositoryKind, data: &[u8]) -> Result<MetadataContent> {
    match kind {
        RepositoryKind::Deb => {
            Ok(MetadataContent::Deb(parse_packages(
                &String::from_utf8_lossy(data),
            )))
        }
        RepositoryKind::Rpm => Ok(MetadataContent::Rpm(read_primary_db(data)?)),
    }
}

fn http_error(err: DownloadError) -> RegistryError {
    match err {
        DownloadError::HttpError { status, url } => RegistryError::HttpStatus { status, url },
        other => RegistryError::Download(other),
    }
}

/// Fetches the metadata of `repo`, skipping the download when `stored`
/// validators show the remote copy is unchanged.
pub fn fetch_metadata(
    transport: &dyn Transport,
    repo: &Repository,
    stored: Option<&Validators>,
    options: &FetchOptions,
) -> Result<FetchOutcome> {
    let stored = stored.filter(|_| !options.force);
    let empty = Validators::default();

    let probe = transport
        .probe(
            &repo.url,
            stored.unwrap_or(&empty),
            options.metadata_timeout,
        )
        .map_err(http_error)?;

    if let Some(stored) = stored {
        if probe.not_modified() {
            debug!("[{}] not modified", repo.name);
            return Ok(FetchOutcome::NotModified);
        }
        if probe.matches(stored) {
            debug!("[{}] size and etag unchanged", repo.name);
            return Ok(FetchOutcome::Unchanged);
        }
    }
    if !probe.is_success() && !probe.not_modified() {
        return Err(RegistryError::HttpStatus {
            status: probe.status,
            url: repo.url.clone(),
        });
    }

    let index = transport
        .fetch(&repo.url, options.metadata_timeout)
        .map_err(http_error)?;

    let validators = Validators {
        etag: probe.etag.clone().or_else(|| index.etag.clone()),
        last_modified: probe
            .last_modified
            .clone()
            .or_else(|| index.last_modified.clone()),
        size: probe
            .content_length
            .or(index.content_length)
            .or_else(|| i64::try_from(index.bytes.len()).ok()),
    };

    let data = match repo.kind {
        RepositoryKind::Deb => index.bytes,
        RepositoryKind::Rpm => {
            let xml = String::from_utf8_lossy(&index.bytes);
            let primary = RepoMd::parse(&xml)?.primary_db(&repo.url)?;
            let url = primary_url(&repo.url, &primary.href)?;

            debug!("[{}] downloading {}", repo.name, url);
            let blob = transport
                .fetch(&url, options.payload_timeout)
                .map_err(http_error)?;
            let data = decompress(&blob.bytes)?;

            if !verify_sha256(&data, &primary.sha256) {
                return Err(RegistryError::ChecksumMismatch {
                    url,
                    expected: primary.sha256,
                    actual: sha256_hex(&data),
                });
            }
            data
        }
    };

    let content = parse_payload(repo.kind, &data)?;
    info!(
        "[{}] fetched {} bytes, {} packages",
        repo.name,
        data.len(),
        content.len()
    );

    Ok(FetchOutcome::Fetched(RepoPayload {
        data,
        validators,
        content,
    }))
}
