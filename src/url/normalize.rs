use crate::{ConfigError, UrlError};
use url::Url;

/// Normalizes a URL string according to ZeroXplorer's dedup rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Reject anything that is not `http` or `https`
/// 3. Reject URLs without a host
/// 4. Apply [`canonicalize`]: drop the fragment and an empty query
///
/// Host lowercasing, default-port removal and dot-segment removal are done
/// by the `url` parser itself.
///
/// # Examples
///
/// ```
/// use zeroxplorer::url::normalize_url;
///
/// let url = normalize_url("http://EX.TEST:80/a/../page#top").unwrap();
/// assert_eq!(url.as_str(), "http://ex.test/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(canonicalize(url))
}

/// Strips the parts of an already-absolute URL that never change which
/// resource is fetched.
///
/// Fragments are always removed, so `/page#a` and `/page#b` dedup to the
/// same visited entry. A bare trailing `?` is removed as well.
pub fn canonicalize(mut url: Url) -> Url {
    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }
    url
}

/// Parses and validates the seed URL given on the command line
///
/// Failure here is fatal: the crawl never starts.
pub fn parse_seed(seed: &str) -> Result<Url, ConfigError> {
    normalize_url(seed).map_err(|e| ConfigError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })
}
