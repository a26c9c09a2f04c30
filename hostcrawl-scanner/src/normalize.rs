use url::{ParseError, Url};

/// Scheme and authority of a crawled page, used to resolve the relative links found on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    pub fn of(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: authority(url).unwrap_or_default(),
        }
    }

    fn base(&self) -> Result<Url, ParseError> {
        if self.host.is_empty() {
            return Err(ParseError::RelativeUrlWithoutBase);
        }
        Url::parse(&format!("{}://{}/", self.scheme, self.host))
    }
}

/// Host plus explicit port, e.g. `example.com` or `127.0.0.1:8080`.
///
/// Default ports are elided by `Url`, so `http://a.test:80/` and `http://a.test/`
/// share the authority `a.test`.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Strip query and fragment in place.
pub fn canonicalize(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}

pub fn canonical(url: &Url) -> Url {
    let mut url = url.clone();
    canonicalize(&mut url);
    url
}

/// Resolve a link found on a page.
///
/// A link that is not an absolute URL inherits the page's scheme and host. Absolute
/// links without a host (`mailto:`, `javascript:`) are returned unchanged.
pub fn resolve_link(link: &str, origin: &Origin) -> Result<Url, ParseError> {
    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => origin.base()?.join(link),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(scheme: &str, host: &str) -> Origin {
        Origin {
            scheme: scheme.to_string(),
            host: host.to_string(),
        }
    }

    #[test]
    fn test_canonicalize_strips_query_and_fragment() {
        let url = Url::parse("http://a.test/page?x=1&y=2#section").unwrap();
        assert_eq!(canonical(&url).as_str(), "http://a.test/page");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        for raw in [
            "http://a.test/",
            "https://a.test/a/b?q=1",
            "http://a.test:8080/p#frag",
            "http://a.test/?__escaped_fragment__",
        ] {
            let once = canonical(&Url::parse(raw).unwrap());
            let twice = canonical(&once);
            assert_eq!(once, twice);
            assert_eq!(Url::parse(once.as_str()).unwrap(), once);
        }
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let url = resolve_link("/p1", &origin("http", "a.test")).unwrap();
        assert_eq!(url.as_str(), "http://a.test/p1");
    }

    #[test]
    fn test_resolve_keeps_parent_port_and_scheme() {
        let url = resolve_link("/docs/intro", &origin("https", "127.0.0.1:8443")).unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1:8443/docs/intro");
    }

    #[test]
    fn test_resolve_path_relative_link() {
        let url = resolve_link("p1", &origin("http", "a.test")).unwrap();
        assert_eq!(url.as_str(), "http://a.test/p1");
    }

    #[test]
    fn test_resolve_protocol_relative_link() {
        let url = resolve_link("//b.test/x", &origin("https", "a.test")).unwrap();
        assert_eq!(url.as_str(), "https://b.test/x");
    }

    #[test]
    fn test_resolve_absolute_link_ignores_origin() {
        let url = resolve_link("http://b.test/x", &origin("https", "a.test")).unwrap();
        assert_eq!(url.as_str(), "http://b.test/x");
    }

    #[test]
    fn test_resolve_hostless_scheme_is_kept() {
        let url = resolve_link("mailto:someone@a.test", &origin("http", "a.test")).unwrap();
        assert_eq!(url.scheme(), "mailto");
        assert_eq!(authority(&url), None);
    }

    #[test]
    fn test_resolve_relative_without_origin_fails() {
        let result = resolve_link("/p1", &origin("", ""));
        assert_eq!(result, Err(ParseError::RelativeUrlWithoutBase));
    }

    #[test]
    fn test_resolve_invalid_link() {
        assert!(resolve_link("http://[::1", &origin("http", "a.test")).is_err());
    }

    #[test]
    fn test_authority_includes_explicit_port() {
        let url = Url::parse("http://127.0.0.1:3000/x").unwrap();
        assert_eq!(authority(&url).as_deref(), Some("127.0.0.1:3000"));

        let url = Url::parse("http://a.test:80/x").unwrap();
        assert_eq!(authority(&url).as_deref(), Some("a.test"));
    }

    #[test]
    fn test_origin_of_page() {
        let url = Url::parse("https://a.test:8443/deep/page?q=1").unwrap();
        assert_eq!(Origin::of(&url), origin("https", "a.test:8443"));
    }
}
