use url::Url;

use crate::error::Error;

/// Validates that a URL is absolute and uses an HTTP(S) scheme.
///
/// Every network operation in this crate (feed loading, pagination, the
/// publishing protocol) goes through this check first, so that `file:`,
/// `ftp:` and other schemes are rejected up front with a descriptive error
/// instead of surfacing as an opaque transport failure.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when the string does not parse as an
/// absolute URL or when the scheme is not `http` or `https`.
pub fn validate_http_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::InvalidArgument(format!("invalid URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidArgument(format!(
            "unsupported URL scheme '{}' in '{}': only http and https are allowed",
            scheme, url
        ))),
    }
}
