//! Content classifier
//!
//! Routes each fetched response either to the extraction pipeline or straight
//! into `external_files`, based only on the declared content type.

use crate::crawler::fetcher::Response;
use url::Url;

/// Outcome of classifying a response
#[derive(Debug)]
pub enum Classification {
    /// Textual content; run the extraction pipeline over it
    Extractable(Response),

    /// Anything else; catalog the URL as an external file
    Opaque { url: Url },
}

/// Returns true if the content type denotes textual content
///
/// Case-insensitive `text` prefix match after leading whitespace. A missing
/// header is not textual.
pub fn is_textual(content_type: Option<&str>) -> bool {
    content_type
        .map(str::trim_start)
        .and_then(|ct| ct.get(..4))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text"))
}

/// Classifies a response
pub fn classify(response: Response) -> Classification {
    if is_textual(response.content_type.as_deref()) {
        Classification::Extractable(response)
    } else {
        Classification::Opaque { url: response.url }
    }
}
