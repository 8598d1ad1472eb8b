pub mod error;
pub mod http_client;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{DownloadError, Result};
pub use transport::{FetchedBody, HttpTransport, ProbeResponse, Transport, Validators};
