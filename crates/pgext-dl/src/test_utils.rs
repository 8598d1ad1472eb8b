//! In-memory [`Transport`] for tests of the crates built on top of this one.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use crate::{
    error::{DownloadError, Result},
    transport::{FetchedBody, ProbeResponse, Transport, Validators},
};

/// Mirror serving fixed bodies with a fixed ETag per URL.
///
/// Probes answer 304 when the request's ETag matches, unless
/// `ignore_conditional` is set. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockTransport {
    pub files: Mutex<HashMap<String, (Vec<u8>, String)>>,
    /// Number of GET requests served so far.
    pub fetches: AtomicUsize,
    pub ignore_conditional: bool,
}

impl MockTransport {
    pub fn serve(&self, url: &str, body: &[u8], etag: &str) {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.to_string(), (body.to_vec(), etag.to_string()));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, url: &str) -> Result<(Vec<u8>, String)> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| {
                DownloadError::HttpError {
                    status: 404,
                    url: url.to_string(),
                }
            })
    }
}

impl Transport for MockTransport {
    fn probe(&self, url: &str, validators: &Validators, _timeout: Duration) -> Result<ProbeResponse> {
        let (body, etag) = self.lookup(url)?;
        let status = if !self.ignore_conditional && validators.etag.as_deref() == Some(etag.as_str()) {
            304
        } else {
            200
        };
        Ok(ProbeResponse {
            status,
            etag: Some(etag),
            last_modified: None,
            content_length: i64::try_from(body.len()).ok(),
        })
    }

    fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedBody> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let (bytes, etag) = self.lookup(url)?;
        Ok(FetchedBody {
            content_length: i64::try_from(bytes.len()).ok(),
            bytes,
            etag: Some(etag),
            last_modified: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_honours_etag() {
        let mirror = MockTransport::default();
        mirror.serve("https://a.test/Packages", b"Package: a\n", "\"e1\"");

        let fresh = mirror
            .probe("https://a.test/Packages", &Validators::default(), Duration::ZERO)
            .unwrap();
        assert_eq!(fresh.status, 200);
        assert_eq!(fresh.content_length, Some(11));

        let stored = Validators {
            etag: Some("\"e1\"".to_string()),
            ..Validators::default()
        };
        let cached = mirror
            .probe("https://a.test/Packages", &stored, Duration::ZERO)
            .unwrap();
        assert!(cached.not_modified());

        let missing = mirror.fetch("https://a.test/nope", Duration::ZERO);
        assert!(matches!(missing, Err(DownloadError::HttpError { status: 404, .. })));
        assert_eq!(mirror.fetch_count(), 1);
    }
}
