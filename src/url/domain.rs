use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to
/// lowercase. The port is never part of the result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use zeroxplorer::url::extract_host;
///
/// let url = Url::parse("https://example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
