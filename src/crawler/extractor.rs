//! Artifact extraction pipeline
//!
//! This module runs a fixed set of independent extractors over one textual
//! response:
//! - Emails (regex over the raw text)
//! - Links (`<a href>`), which also yield traversal candidates
//! - External files (`<a>`/`<link>` targets with document/stylesheet suffixes)
//! - Script sources
//! - Form field names
//! - Image, video and audio sources
//! - Comments
//!
//! Extractors never see each other's output. A failing extractor is reported
//! in `PageExtraction::failures` and the rest still run.

use crate::output::ArtifactKind;
use crate::url::{canonicalize, resolve_reference, ScopeFilter};
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Email pattern: `local@domain.tld` with a 2+ letter top-level label
const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// Suffixes that mark a link target as an external file (case-sensitive)
const EXTERNAL_FILE_SUFFIXES: &[&str] = &[".css", ".pdf", ".doc", ".docx", ".xls", ".xlsx"];

/// CSS selectors used by the markup extractors
///
/// Each extractor parses only its own selector, so a selector that fails to
/// parse disables that one extractor for the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorTable {
    pub links: &'static str,
    pub file_references: &'static str,
    pub scripts: &'static str,
    pub form_fields: &'static str,
    pub images: &'static str,
    pub videos: &'static str,
    pub audio: &'static str,
}

impl SelectorTable {
    /// The selectors the crawler runs with
    pub const DEFAULT: SelectorTable = SelectorTable {
        links: "a[href]",
        file_references: "link[href], a[href]",
        scripts: "script[src]",
        form_fields: "input[name], textarea[name], select[name]",
        images: "img[src]",
        videos: "video[src], video source[src]",
        audio: "audio[src], audio source[src]",
    };

    /// Selector for a media collection; `None` for non-media kinds
    pub fn media(&self, kind: ArtifactKind) -> Option<&'static str> {
        match kind {
            ArtifactKind::Images => Some(self.images),
            ArtifactKind::Videos => Some(self.videos),
            ArtifactKind::Audio => Some(self.audio),
            _ => None,
        }
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Failure of a single extractor on a single page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(String),
}

/// Result of the link extractor
#[derive(Debug, Default, Clone)]
pub struct LinkExtraction {
    /// Strings recorded into `links`: resolved for relative targets,
    /// verbatim for absolute ones
    pub recorded: Vec<String>,

    /// In-scope targets, canonicalized, that may be traversed
    pub discovered: Vec<Url>,
}

/// Everything extracted from one page
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Artifacts per collection, in extractor order
    pub artifacts: Vec<(ArtifactKind, Vec<String>)>,

    /// In-scope URLs found by the link extractor
    pub discovered: Vec<Url>,

    /// Extractors that failed on this page
    pub failures: Vec<(ArtifactKind, ExtractionError)>,
}

impl PageExtraction {
    fn record(&mut self, kind: ArtifactKind, result: Result<Vec<String>, ExtractionError>) {
        match result {
            Ok(values) => self.artifacts.push((kind, values)),
            Err(error) => self.failures.push((kind, error)),
        }
    }

    /// Number of artifact values produced (before dedup)
    pub fn artifact_count(&self) -> usize {
        self.artifacts.iter().map(|(_, values)| values.len()).sum()
    }

    /// Returns the values produced for `kind`
    pub fn values(&self, kind: ArtifactKind) -> &[String] {
        self.artifacts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }
}

/// Runs every extractor over one page
///
/// # Arguments
///
/// * `body` - The page text
/// * `page_url` - The URL the page was served from; base for resolution
/// * `scope` - Scope filter deciding which links are traversal candidates
///
/// # Example
///
/// ```
/// use url::Url;
/// use zeroxplorer::crawler::extract_page;
/// use zeroxplorer::output::ArtifactKind;
/// use zeroxplorer::url::ScopeFilter;
///
/// let page = Url::parse("http://ex.test/").unwrap();
/// let scope = ScopeFilter::new(&page).unwrap();
/// let html = r#"<a href="/p2">next</a><script src="/a.js"></script>"#;
///
/// let extraction = extract_page(html, &page, &scope);
/// assert_eq!(extraction.values(ArtifactKind::JsFiles), ["http://ex.test/a.js"]);
/// assert_eq!(extraction.discovered[0].as_str(), "http://ex.test/p2");
/// ```
pub fn extract_page(body: &str, page_url: &Url, scope: &ScopeFilter) -> PageExtraction {
    extract_page_with(body, page_url, scope, &SelectorTable::DEFAULT)
}

/// Runs every extractor over one page with an explicit selector table
pub fn extract_page_with(
    body: &str,
    page_url: &Url,
    scope: &ScopeFilter,
    selectors: &SelectorTable,
) -> PageExtraction {
    let document = Html::parse_document(body);
    let mut extraction = PageExtraction::default();

    extraction.record(ArtifactKind::Emails, extract_emails(body));

    match extract_links(&document, page_url, scope, selectors) {
        Ok(links) => {
            extraction.discovered = links.discovered;
            extraction
                .artifacts
                .push((ArtifactKind::Links, links.recorded));
        }
        Err(error) => extraction.failures.push((ArtifactKind::Links, error)),
    }

    extraction.record(
        ArtifactKind::ExternalFiles,
        extract_external_files(&document, page_url, selectors),
    );
    extraction.record(
        ArtifactKind::JsFiles,
        extract_scripts(&document, page_url, selectors),
    );
    extraction.record(
        ArtifactKind::FormFields,
        extract_form_fields(&document, selectors),
    );
    for kind in [ArtifactKind::Images, ArtifactKind::Videos, ArtifactKind::Audio] {
        extraction.record(kind, extract_media(&document, page_url, kind, selectors));
    }
    extraction.record(ArtifactKind::Comments, Ok(extract_comments(&document)));

    extraction
}

fn email_regex() -> Result<&'static Regex, ExtractionError> {
    static EMAIL_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN))
        .as_ref()
        .map_err(|e| ExtractionError::Pattern(e.to_string()))
}

fn parse_selector(selector: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::Selector {
        selector,
        message: format!("{:?}", e),
    })
}

/// Collects the raw value of `attr` on every element matching `selector`
fn select_attr(
    document: &Html,
    selector: &'static str,
    attr: &str,
) -> Result<Vec<String>, ExtractionError> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect())
}

/// Resolves each reference against `base`, dropping the unresolvable ones
fn resolve_all(references: Vec<String>, base: &Url) -> Vec<String> {
    references
        .iter()
        .filter_map(|reference| match resolve_reference(reference, base) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!("Dropping reference: {}", e);
                None
            }
        })
        .collect()
}

fn is_mailto(href: &str) -> bool {
    href.get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

/// Scans raw text for email addresses
pub fn extract_emails(text: &str) -> Result<Vec<String>, ExtractionError> {
    let regex = email_regex()?;
    Ok(regex
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Collects hyperlink targets and the in-scope traversal candidates
///
/// # Rules
///
/// - `mailto:` targets are skipped entirely
/// - Relative targets are resolved against `base` and recorded resolved
/// - Absolute targets (any scheme) are recorded verbatim
/// - Targets that cannot be resolved are dropped
/// - Only `http`/`https` targets on the scope host become candidates
pub fn extract_links(
    document: &Html,
    base: &Url,
    scope: &ScopeFilter,
    selectors: &SelectorTable,
) -> Result<LinkExtraction, ExtractionError> {
    let mut links = LinkExtraction::default();

    for href in select_attr(document, selectors.links, "href")? {
        let href = href.trim();
        if href.is_empty() || is_mailto(href) {
            continue;
        }

        let (resolved, recorded) = match Url::parse(href) {
            Ok(absolute) => (absolute, href.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => match scope.resolve(href, base) {
                Ok(resolved) => {
                    let recorded = resolved.to_string();
                    (resolved, recorded)
                }
                Err(e) => {
                    tracing::debug!("Dropping link: {}", e);
                    continue;
                }
            },
            Err(e) => {
                tracing::debug!("Dropping malformed link '{}': {}", href, e);
                continue;
            }
        };

        if scope.accepts_url(&resolved) {
            links.discovered.push(canonicalize(resolved));
        }
        links.recorded.push(recorded);
    }

    Ok(links)
}

/// Collects stylesheet and document references
pub fn extract_external_files(
    document: &Html,
    base: &Url,
    selectors: &SelectorTable,
) -> Result<Vec<String>, ExtractionError> {
    let references: Vec<String> = select_attr(document, selectors.file_references, "href")?
        .into_iter()
        .filter(|href| {
            let href = href.trim();
            EXTERNAL_FILE_SUFFIXES
                .iter()
                .any(|suffix| href.ends_with(suffix))
        })
        .collect();

    Ok(resolve_all(references, base))
}

/// Collects script sources
pub fn extract_scripts(
    document: &Html,
    base: &Url,
    selectors: &SelectorTable,
) -> Result<Vec<String>, ExtractionError> {
    let sources = select_attr(document, selectors.scripts, "src")?;
    Ok(resolve_all(sources, base))
}

/// Collects form control names, unresolved
pub fn extract_form_fields(
    document: &Html,
    selectors: &SelectorTable,
) -> Result<Vec<String>, ExtractionError> {
    select_attr(document, selectors.form_fields, "name")
}

/// Collects media sources for one media collection
///
/// `kind` must be `Images`, `Videos` or `Audio`; any other kind yields
/// nothing.
pub fn extract_media(
    document: &Html,
    base: &Url,
    kind: ArtifactKind,
    selectors: &SelectorTable,
) -> Result<Vec<String>, ExtractionError> {
    let Some(selector) = selectors.media(kind) else {
        return Ok(Vec::new());
    };
    let sources = select_attr(document, selector, "src")?;
    Ok(resolve_all(sources, base))
}

/// Collects every comment node as `<!--text-->`
pub fn extract_comments(document: &Html) -> Vec<String> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Comment(comment) => Some(format!("<!--{}-->", &**comment)),
            _ => None,
        })
        .collect()
}
