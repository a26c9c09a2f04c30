use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolution state of a URL seen during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Claimed by a fetch task that has not reported back yet
    Pending,
    /// Fetch failed, or the URL is outside the approval policy
    Rejected,
    /// Fetched and approved
    Accepted,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// The orchestrator's answer to a fetch task asking to own the page it fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    /// The canonical page was already resolved by another task
    Duplicate,
}

/// Every URL seen during a crawl and how it ended.
///
/// Owned by the orchestrator loop alone. Entries are inserted once and terminal
/// outcomes are never overwritten.
#[derive(Debug, Default, Clone)]
pub struct VisitedRegistry {
    entries: HashMap<String, Outcome>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn outcome(&self, url: &str) -> Option<Outcome> {
        self.entries.get(url).copied()
    }

    /// Insert `url` as pending. Returns `true` only for the first caller.
    pub fn claim(&mut self, url: &str) -> bool {
        if self.entries.contains_key(url) {
            return false;
        }
        self.entries.insert(url.to_string(), Outcome::Pending);
        true
    }

    /// Mark `url` rejected unless it already reached a terminal outcome.
    pub fn reject(&mut self, url: &str) {
        let entry = self
            .entries
            .entry(url.to_string())
            .or_insert(Outcome::Pending);
        if !entry.is_terminal() {
            *entry = Outcome::Rejected;
        }
    }

    /// Resolve a fetched page.
    ///
    /// `requested` is the URL the task was dispatched for, `canonical` the page the
    /// server resolved it to. When they differ, `requested` was only an alias and ends
    /// rejected.
    pub fn settle(&mut self, requested: &str, canonical: &str, approved: bool) -> Verdict {
        let verdict = match self.outcome(canonical) {
            Some(outcome) if outcome.is_terminal() => Verdict::Duplicate,
            _ => {
                let (outcome, verdict) = if approved {
                    (Outcome::Accepted, Verdict::Accepted)
                } else {
                    (Outcome::Rejected, Verdict::Rejected)
                };
                self.entries.insert(canonical.to_string(), outcome);
                verdict
            }
        };

        if requested != canonical {
            self.reject(requested);
        }
        verdict
    }

    /// True once no entry is pending.
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|outcome| outcome.is_terminal())
    }

    pub fn into_entries(self) -> HashMap<String, Outcome> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_first_caller_wins() {
        let mut registry = VisitedRegistry::new();
        assert!(registry.claim("http://a.test/"));
        assert!(!registry.claim("http://a.test/"));
        assert!(!registry.claim("http://a.test/"));
        assert_eq!(registry.outcome("http://a.test/"), Some(Outcome::Pending));
        assert_eq!(registry.into_entries().len(), 1);
    }

    #[test]
    fn test_reject_does_not_overwrite_terminal() {
        let mut registry = VisitedRegistry::new();
        registry.claim("http://a.test/");
        assert_eq!(
            registry.settle("http://a.test/", "http://a.test/", true),
            Verdict::Accepted
        );
        registry.reject("http://a.test/");
        assert_eq!(registry.outcome("http://a.test/"), Some(Outcome::Accepted));
    }

    #[test]
    fn test_reject_unseen_url() {
        let mut registry = VisitedRegistry::new();
        registry.reject("http://b.test/x");
        assert_eq!(registry.outcome("http://b.test/x"), Some(Outcome::Rejected));
        assert!(!registry.claim("http://b.test/x"));
    }

    #[test]
    fn test_settle_unapproved_page() {
        let mut registry = VisitedRegistry::new();
        registry.claim("http://a.test/");
        assert_eq!(
            registry.settle("http://a.test/", "http://a.test/", false),
            Verdict::Rejected
        );
        assert_eq!(registry.outcome("http://a.test/"), Some(Outcome::Rejected));
    }

    #[test]
    fn test_settle_redirect_marks_alias_rejected() {
        let mut registry = VisitedRegistry::new();
        registry.claim("http://a.test/old");
        let verdict = registry.settle("http://a.test/old", "http://a.test/new", true);
        assert_eq!(verdict, Verdict::Accepted);
        assert_eq!(registry.outcome("http://a.test/old"), Some(Outcome::Rejected));
        assert_eq!(registry.outcome("http://a.test/new"), Some(Outcome::Accepted));
    }

    #[test]
    fn test_settle_twice_is_duplicate() {
        let mut registry = VisitedRegistry::new();
        registry.claim("http://a.test/one");
        registry.claim("http://a.test/two");
        assert_eq!(
            registry.settle("http://a.test/one", "http://a.test/page", true),
            Verdict::Accepted
        );
        assert_eq!(
            registry.settle("http://a.test/two", "http://a.test/page", true),
            Verdict::Duplicate
        );
        assert_eq!(registry.outcome("http://a.test/page"), Some(Outcome::Accepted));
        assert!(registry.is_settled());
    }

    #[test]
    fn test_settle_resolves_pending_target_claimed_elsewhere() {
        let mut registry = VisitedRegistry::new();
        registry.claim("http://a.test/old");
        registry.claim("http://a.test/new");
        assert_eq!(
            registry.settle("http://a.test/old", "http://a.test/new", true),
            Verdict::Accepted
        );
        // The task dispatched for /new arrives second.
        assert_eq!(
            registry.settle("http://a.test/new", "http://a.test/new", true),
            Verdict::Duplicate
        );
        assert_eq!(registry.outcome("http://a.test/new"), Some(Outcome::Accepted));
    }

    #[test]
    fn test_is_settled() {
        let mut registry = VisitedRegistry::new();
        assert!(registry.is_settled());
        registry.claim("http://a.test/");
        assert!(!registry.is_settled());
        registry.reject("http://a.test/");
        assert!(registry.is_settled());
    }
}
