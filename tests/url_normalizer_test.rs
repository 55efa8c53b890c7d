use linkharvest::normalize;
use url::Url;

#[cfg(test)]
mod url_normalizer_tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    #[test]
    fn test_normalize_removes_fragment() {
        let url = normalize("https://example.com/page#section", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_removes_trailing_slash_from_path() {
        let url = normalize("https://example.com/page/", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_keeps_trailing_slash_for_root() {
        let url = normalize("https://example.com/", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_lowercases_scheme_and_host() {
        let url = normalize("HTTPS://EXAMPLE.COM/Page", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_normalize_collapses_default_port() {
        let http = normalize("http://example.com:80/a", None).unwrap();
        assert_eq!(http.as_str(), "http://example.com/a");

        let https = normalize("https://example.com:443/a", None).unwrap();
        assert_eq!(https.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_normalize_keeps_non_default_port() {
        let url = normalize("https://example.com:8443/a", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com:8443/a");
    }

    #[test]
    fn test_normalize_resolves_root_relative_link() {
        let url = normalize("/a.md", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/a.md");
    }

    #[test]
    fn test_normalize_resolves_relative_link() {
        let url = normalize("sibling", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/sibling");
    }

    #[test]
    fn test_normalize_resolves_protocol_relative_link() {
        let url = normalize("//other.test/x", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://other.test/x");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize("http://", None).is_err());
        assert!(normalize("not a url at all", None).is_err());
    }

    #[test]
    fn test_normalize_rejects_relative_without_base() {
        assert!(normalize("/a.md", None).is_err());
    }

    #[test]
    fn test_normalize_rejects_unsupported_schemes() {
        assert!(normalize("ftp://example.com/file", None).is_err());
        assert!(normalize("mailto:user@example.com", Some(&base())).is_err());
        assert!(normalize("javascript:void(0)", Some(&base())).is_err());
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("https://Example.com/a/b/#frag", None).unwrap();
        let twice = normalize(once.as_str(), None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_semantically_identical_urls_compare_equal() {
        // Dedup correctness: all spellings of the same page must collide.
        let a = normalize("https://example.com/docs/", None).unwrap();
        let b = normalize("HTTPS://EXAMPLE.COM:443/docs#intro", None).unwrap();
        assert_eq!(a, b, "equivalent URLs must normalize identically");
    }
}
