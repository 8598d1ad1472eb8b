use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(pgext_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(pgext_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(pgext_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error(transparent)]
    #[diagnostic(code(pgext_dl::io))]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_invalid_url() {
        let err = DownloadError::InvalidUrl {
            url: "not a url".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid URL"));
        assert!(msg.contains("not a url"));
    }

    #[test]
    fn test_download_error_http_error() {
        let err = DownloadError::HttpError {
            status: 404,
            url: "https://repo.pigsty.io/yum/pgsql/el8.x86_64/repodata/repomd.xml".to_string(),
        };
        assert!(err.to_string().starts_with("HTTP 404: https://repo.pigsty.io"));
    }

    #[test]
    fn test_download_error_from_io() {
        let err: DownloadError = std::io::Error::other("broken pipe").into();
        assert!(matches!(err, DownloadError::Io(_)));
    }
}
