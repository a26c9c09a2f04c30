use crate::registry::Outcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Fetch tasks spawned
    pub dispatched: usize,
    pub accepted: usize,
    /// Links and pages turned away by the approval policy
    pub rejected: usize,
    /// Fetches that failed at the transport level
    pub failed: usize,
    /// Links or fetched pages that had already been seen
    pub duplicates: usize,
}

/// Final state of a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub entries: HashMap<String, Outcome>,
    pub stats: CrawlStats,
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CrawlStats::default(),
            elapsed: Duration::from_secs(0),
        }
    }

    /// URLs that were fetched successfully and approved, sorted.
    pub fn accepted_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, outcome)| **outcome == Outcome::Accepted)
            .map(|(url, _)| url.as_str())
            .collect();
        urls.sort_unstable();
        urls
    }

    pub fn outcome(&self, url: &str) -> Option<Outcome> {
        self.entries.get(url).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_urls_filters_and_sorts() {
        let mut report = CrawlReport::empty();
        report
            .entries
            .insert("http://a.test/z".to_string(), Outcome::Accepted);
        report
            .entries
            .insert("http://a.test/a".to_string(), Outcome::Accepted);
        report
            .entries
            .insert("http://b.test/".to_string(), Outcome::Rejected);

        assert_eq!(report.accepted_urls(), vec!["http://a.test/a", "http://a.test/z"]);
        assert_eq!(report.outcome("http://b.test/"), Some(Outcome::Rejected));
        assert_eq!(report.outcome("http://c.test/"), None);
    }
}
