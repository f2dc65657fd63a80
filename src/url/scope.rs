use crate::url::domain::extract_host;
use crate::UrlError;
use url::Url;

/// Resolves a reference (absolute or relative) against the page it came from
///
/// Blank references and references the URL parser refuses are reported as
/// [`UrlError::Unresolvable`]; callers drop those without recording them.
pub fn resolve_reference(reference: &str, base: &Url) -> Result<Url, UrlError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UrlError::Unresolvable {
            reference: reference.to_string(),
            base: base.to_string(),
            reason: "empty reference".to_string(),
        });
    }

    base.join(reference).map_err(|e| UrlError::Unresolvable {
        reference: reference.to_string(),
        base: base.to_string(),
        reason: e.to_string(),
    })
}

/// Decides which URLs belong to the crawl
///
/// The allowed host is fixed from the seed when the filter is built. A URL is
/// in scope iff it is `http`/`https` and its host (without port) equals that
/// host exactly; subdomains are out of scope.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    host: String,
}

impl ScopeFilter {
    /// Builds a filter anchored on the seed's host
    pub fn new(seed: &Url) -> Result<Self, UrlError> {
        let host = extract_host(seed).ok_or(UrlError::MissingHost)?;
        Ok(Self { host })
    }

    /// The allowed host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolves `candidate` against `referrer`
    pub fn resolve(&self, candidate: &str, referrer: &Url) -> Result<Url, UrlError> {
        resolve_reference(candidate, referrer)
    }

    /// Returns true if an absolute URL is eligible for traversal
    pub fn accepts_url(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }
        extract_host(url).is_some_and(|host| host == self.host)
    }

    /// Returns true if `candidate`, resolved against `referrer`, is in scope
    pub fn accept(&self, candidate: &str, referrer: &Url) -> bool {
        match self.resolve(candidate, referrer) {
            Ok(url) => self.accepts_url(&url),
            Err(e) => {
                tracing::trace!("Dropping unresolvable candidate: {}", e);
                false
            }
        }
    }
}
