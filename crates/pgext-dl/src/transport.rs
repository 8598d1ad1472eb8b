//! Conditional HTTP access to repository metadata.
//!
//! [`Transport`] is the seam between the sync orchestrator and the network:
//! [`HttpTransport`] talks to real mirrors through the shared agent, tests
//! substitute an in-memory implementation.

use std::time::Duration;

use tracing::trace;
use ureq::{
    http::{
        header::{CONTENT_LENGTH, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED},
        HeaderMap, StatusCode,
    },
    Body,
};
use url::Url;

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
};

/// Cache validators remembered from a previous download.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub size: Option<i64>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Outcome of a conditional HEAD request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_length: Option<i64>,
}

impl ProbeResponse {
    pub fn not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED.as_u16()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the remote size and ETag both equal the stored ones.
    pub fn matches(&self, validators: &Validators) -> bool {
        match (
            self.content_length,
            validators.size,
            self.etag.as_deref(),
            validators.etag.as_deref(),
        ) {
            (Some(remote_size), Some(size), Some(remote_etag), Some(etag)) => {
                remote_size == size && remote_etag == etag
            }
            _ => false,
        }
    }
}

/// A fully downloaded body with the validators the server sent along.
#[derive(Clone, Debug, Default)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_length: Option<i64>,
}

pub trait Transport: Send + Sync {
    /// Sends a HEAD request carrying `If-None-Match` / `If-Modified-Since`
    /// built from `validators`.
    fn probe(&self, url: &str, validators: &Validators, timeout: Duration)
        -> Result<ProbeResponse>;

    /// Downloads `url` entirely. Non-success statuses are errors.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedBody>;
}

/// [`Transport`] backed by the shared ureq agent.
#[derive(Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

fn header_string(headers: &HeaderMap, name: impl ureq::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

fn content_length(headers: &HeaderMap) -> Option<i64> {
    header_string(headers, CONTENT_LENGTH).and_then(|value| value.trim().parse().ok())
}

fn check_url(url: &str) -> Result<()> {
    Url::parse(url).map_err(|source| {
        DownloadError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    })?;
    Ok(())
}

fn map_status_error(err: ureq::Error, url: &str) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => {
            DownloadError::HttpError {
                status,
                url: url.to_string(),
            }
        }
        other => DownloadError::from(other),
    }
}

impl Transport for HttpTransport {
    fn probe(
        &self,
        url: &str,
        validators: &Validators,
        timeout: Duration,
    ) -> Result<ProbeResponse> {
        check_url(url)?;

        let mut req = SHARED_AGENT.head(url, timeout);
        if let Some(etag) = &validators.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = &validators.last_modified {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }

        let resp = req.call().map_err(|err| map_status_error(err, url))?;

        let headers = resp.headers();
        let probe = ProbeResponse {
            status: resp.status().as_u16(),
            etag: header_string(headers, ETAG),
            last_modified: header_string(headers, LAST_MODIFIED),
            content_length: content_length(headers),
        };
        trace!(url = url, status = probe.status, "probed remote metadata");
        Ok(probe)
    }

    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedBody> {
        check_url(url)?;

        let resp = SHARED_AGENT
            .get(url, timeout)
            .call()
            .map_err(|err| map_status_error(err, url))?;

        if !resp.status().is_success() {
            return Err(DownloadError::HttpError {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let etag = header_string(resp.headers(), ETAG);
        let last_modified = header_string(resp.headers(), LAST_MODIFIED);
        let content_length = content_length(resp.headers());

        let body: Body = resp.into_body();
        let bytes = body.into_with_config().limit(u64::MAX).read_to_vec()?;
        trace!(url = url, bytes = bytes.len(), "downloaded remote payload");

        Ok(FetchedBody {
            bytes,
            etag,
            last_modified,
            content_length,
        })
    }
}
