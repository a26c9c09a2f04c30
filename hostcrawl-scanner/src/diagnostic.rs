use std::fmt;
use std::sync::Arc;

/// What the crawler was doing when a recoverable error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Getting,
    ParsingSeed,
    ParsingChild,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Action::Getting => "getting",
            Action::ParsingSeed => "parsing seed",
            Action::ParsingChild => "parsing child",
        };
        f.write_str(action)
    }
}

/// A per-URL error that was recovered from. Displays as the stderr diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlDiagnostic {
    pub cause: String,
    pub action: Action,
    pub url: String,
}

impl CrawlDiagnostic {
    pub fn new(cause: impl fmt::Display, action: Action, url: impl Into<String>) -> Self {
        Self {
            cause: cause.to_string(),
            action,
            url: url.into(),
        }
    }
}

impl fmt::Display for CrawlDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {} while {} {}", self.cause, self.action, self.url)
    }
}

pub type DiagnosticCallback = Arc<dyn Fn(&CrawlDiagnostic) + Send + Sync>;
