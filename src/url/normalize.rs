use url::{ParseError, Url};

/// Query parameters that only carry tracking data
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes an absolute link so that trivially different spellings of the
/// same resource share one identifier
///
/// # Normalization Steps
///
/// 1. Remove fragment (everything after #)
/// 2. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 3. Sort remaining query parameters by key (stable, so repeated keys keep
///    their relative order)
/// 4. Remove empty query string (trailing ?)
///
/// Host lowercasing and dot-segment removal already happen when `url` parses
/// the link. Scheme, `www.` and trailing slashes are left alone: they can name
/// different resources.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::normalize_link;
/// use url::Url;
///
/// let url = Url::parse("http://Example.com/a/../b?utm_source=x#top").unwrap();
/// assert_eq!(normalize_link(url).as_str(), "http://example.com/b");
/// ```
pub fn normalize_link(mut url: Url) -> Url {
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    url
}

/// Parses a crawl seed and normalizes it the same way as discovered links
///
/// A seed spelled with a fragment, tracking parameters or unsorted query
/// pairs must still match the links its own page reports for it.
pub fn normalize_seed(seed: &str) -> Result<Url, ParseError> {
    Url::parse(seed).map(normalize_link)
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
