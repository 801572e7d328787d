use url::Url;

/// Extracts the lowercase host from a parsed URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_crawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses an identifier and returns its lowercase host
///
/// Returns None for identifiers that are not absolute URLs or have no host.
pub fn host_of(identifier: &str) -> Option<String> {
    Url::parse(identifier).ok().as_ref().and_then(extract_domain)
}
