use crate::error::{Result, ScanError};
use crate::normalize::authority;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

pub const DEFAULT_SCHEMES: [&str; 2] = ["http", "https"];

/// Hosts and schemes a URL must match to be fetched and counted.
///
/// Immutable once built. Host comparison is exact on the authority (host plus
/// explicit port); there is no subdomain or wildcard matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPolicy {
    hosts: HashSet<String>,
    schemes: HashSet<String>,
}

impl ApprovalPolicy {
    pub fn new<H, S>(hosts: H, schemes: S) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            schemes: schemes.into_iter().map(Into::into).collect(),
        }
    }

    /// Approve the hosts of the given seeds over the default schemes.
    ///
    /// Seeds that fail to parse contribute nothing and are returned alongside the
    /// policy so the caller can report them.
    pub fn from_seeds<S: AsRef<str>>(seeds: &[S]) -> (Self, Vec<(String, ScanError)>) {
        let mut hosts = HashSet::new();
        let mut invalid = Vec::new();

        for seed in seeds {
            let seed = seed.as_ref();
            match Url::parse(seed) {
                Ok(url) => match authority(&url) {
                    Some(host) => {
                        hosts.insert(host);
                    }
                    None => invalid.push((
                        seed.to_string(),
                        ScanError::InvalidUrl(format!("{} has no host", seed)),
                    )),
                },
                Err(e) => invalid.push((seed.to_string(), e.into())),
            }
        }

        debug!("Approved hosts: {:?}", hosts);
        let policy = Self {
            hosts,
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
        };
        (policy, invalid)
    }

    pub fn with_schemes<S>(mut self, schemes: S) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    pub fn approves(&self, url: &Url) -> bool {
        let host_ok = authority(url)
            .map(|host| self.hosts.contains(&host))
            .unwrap_or(false);
        host_ok && self.schemes.contains(url.scheme())
    }

    /// Parse and check a raw URL, surfacing parse failures.
    pub fn check(&self, raw: &str) -> Result<bool> {
        let url = Url::parse(raw)?;
        Ok(self.approves(&url))
    }

    /// Parse and check a raw URL; anything unparseable is not approved.
    pub fn approved(&self, raw: &str) -> bool {
        self.check(raw).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ApprovalPolicy {
        ApprovalPolicy::new(["a.test", "127.0.0.1:8080"], DEFAULT_SCHEMES)
    }

    #[test]
    fn test_approves_matching_host_and_scheme() {
        let policy = policy();
        assert!(policy.approved("http://a.test/"));
        assert!(policy.approved("https://a.test/deep/page"));
        assert!(policy.approved("http://127.0.0.1:8080/x"));
    }

    #[test]
    fn test_rejects_other_host() {
        let policy = policy();
        assert!(!policy.approved("http://b.test/x"));
        assert!(!policy.approved("http://sub.a.test/"));
        assert!(!policy.approved("http://127.0.0.1:9090/x"));
        assert!(!policy.approved("http://127.0.0.1/x"));
    }

    #[test]
    fn test_rejects_other_scheme() {
        let policy = policy();
        assert!(!policy.approved("ftp://a.test/file"));
        assert!(!policy.approved("mailto:someone@a.test"));
        assert!(!policy.approved("javascript:void(0)"));
    }

    #[test]
    fn test_parse_failure_is_not_approved() {
        let policy = policy();
        assert!(!policy.approved("not a url"));
        assert!(!policy.approved("/relative/path"));
        assert!(policy.check("not a url").is_err());
    }

    #[test]
    fn test_check_reports_result() {
        let policy = policy();
        assert!(policy.check("http://a.test/").unwrap());
        assert!(!policy.check("http://b.test/").unwrap());
    }

    #[test]
    fn test_from_seeds_collects_hosts() {
        let (policy, invalid) = ApprovalPolicy::from_seeds(&[
            "http://a.test/",
            "https://b.test:8443/start",
            "::garbage::",
        ]);
        assert_eq!(
            policy,
            ApprovalPolicy::new(["a.test", "b.test:8443"], DEFAULT_SCHEMES)
        );
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0, "::garbage::");

        // Scheme set is shared across hosts.
        assert!(policy.approved("https://a.test/"));
        assert!(policy.approved("http://b.test:8443/"));
    }

    #[test]
    fn test_from_seeds_rejects_hostless_seed() {
        let (policy, invalid) = ApprovalPolicy::from_seeds(&["mailto:x@a.test"]);
        assert_eq!(policy, ApprovalPolicy::new(Vec::<String>::new(), DEFAULT_SCHEMES));
        assert!(matches!(invalid[0].1, ScanError::InvalidUrl(_)));
    }

    #[test]
    fn test_with_schemes_overrides_defaults() {
        let policy = policy().with_schemes(["https"]);
        assert!(policy.approved("https://a.test/"));
        assert!(!policy.approved("http://a.test/"));
    }

    #[test]
    fn test_property_host_and_scheme_membership() {
        let policy = policy();
        for host in ["a.test", "b.test", "127.0.0.1:8080"] {
            for scheme in ["http", "https", "ftp"] {
                let raw = format!("{}://{}/p", scheme, host);
                let expected = host != "b.test" && scheme != "ftp";
                assert_eq!(policy.approved(&raw), expected, "{}", raw);
            }
        }
    }
}
