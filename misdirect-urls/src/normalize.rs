use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static MULTI_SLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/{2,}").expect("slash pattern is valid"));

/// Produces the unified form links are stored and compared in: site
/// relative, single slashes, no surrounding slashes.
///
/// Case is preserved; comparisons happen case-insensitively at match time.
#[derive(Clone, Debug, Default)]
pub struct UrlNormalizer {
    site_host: Option<String>,
}

impl UrlNormalizer {
    pub fn new(site_host: Option<String>) -> Self {
        Self { site_host }
    }

    /// Unify a raw URL.
    ///
    /// Absolute URLs on the site's own host lose their scheme and authority
    /// (path and query survive), absolute URLs on a foreign host are kept
    /// intact, and everything else has its slashes collapsed and trimmed.
    /// Idempotent.
    pub fn normalize(&self, url: &str) -> String {
        let trimmed = url.trim();
        if let Ok(parsed) = Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                if self.is_site_host(host) {
                    let mut local = parsed.path().to_string();
                    if let Some(query) = parsed.query() {
                        local.push('?');
                        local.push_str(query);
                    }
                    return unify_path(&local);
                }
                return trimmed.to_string();
            }
        }
        unify_path(trimmed)
    }

    fn is_site_host(&self, host: &str) -> bool {
        self.site_host
            .as_deref()
            .is_some_and(|site| site.eq_ignore_ascii_case(host))
    }
}

fn unify_path(path: &str) -> String {
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };
    let collapsed = MULTI_SLASH.replace_all(path, "/");
    let trimmed = collapsed.as_ref();
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    match query {
        Some(query) => format!("{trimmed}?{query}"),
        None => trimmed.to_string(),
    }
}

/// Join path fragments with single slashes, keeping the first fragment's
/// leading slash and the last fragment's trailing slash.
pub fn join_links<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if joined.is_empty() {
            joined.push_str(part);
            continue;
        }
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part.trim_start_matches('/'));
    }
    joined
}

/// Strip a leading `base_path` (and any remaining leading slash) from a
/// link, keeping the trailing slash. Used when freezing page links into
/// literal redirect rules.
pub fn make_relative(link: &str, base_path: &str) -> String {
    let stripped = link.strip_prefix(base_path).unwrap_or(link);
    stripped.trim_start_matches('/').to_string()
}
