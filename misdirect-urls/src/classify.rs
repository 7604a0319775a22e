use url::Url;

/// Schemes the strict external-URL check accepts.
const EXTERNAL_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Whether a link is a fully qualified third-party URL (scheme and host
/// present) rather than a site-relative path.
///
/// Colon-bearing relative paths like `foo:bar/baz` parse scheme-only with
/// no host and are not external.
pub fn is_external_url(link: &str) -> bool {
    parse_external(link).is_some()
}

/// The host component of an external link.
pub fn external_host(link: &str) -> Option<String> {
    parse_external(link)?.host_str().map(str::to_owned)
}

fn parse_external(link: &str) -> Option<Url> {
    let url = Url::parse(link.trim()).ok()?;
    (url.has_host() && EXTERNAL_SCHEMES.contains(&url.scheme())).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schemes_are_external() {
        assert!(is_external_url("http://example.com"));
        assert!(is_external_url("https://example.com/page"));
        assert!(is_external_url("ftp://files.example.com/pub"));
    }

    #[test]
    fn test_relative_paths_are_not_external() {
        assert!(!is_external_url("wrong/page"));
        assert!(!is_external_url("/wrong/page"));
        assert!(!is_external_url(""));
    }

    #[test]
    fn test_colon_bearing_relative_path_is_not_external() {
        assert!(!is_external_url("foo:bar/baz"));
        assert!(!is_external_url("mailto:someone@example.com"));
    }

    #[test]
    fn test_fragment_and_query_only_are_not_external() {
        assert!(!is_external_url("#section"));
        assert!(!is_external_url("?page=2"));
    }

    #[test]
    fn test_external_host() {
        assert_eq!(
            external_host("https://example.com/page"),
            Some("example.com".to_string())
        );
        assert_eq!(external_host("wrong/page"), None);
        assert_eq!(external_host("foo:bar/baz"), None);
    }
}
