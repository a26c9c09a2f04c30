pub mod crawler;
pub mod diagnostic;
pub mod error;
pub mod fetch;
pub mod links;
pub mod normalize;
pub mod policy;
pub mod registry;
pub mod result;

pub use crawler::{Crawler, ProgressCallback, ESCAPE_FRAGMENT_SUFFIX};
pub use diagnostic::{Action, CrawlDiagnostic, DiagnosticCallback};
pub use error::ScanError;
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use links::{HtmlLinkExtractor, LinkExtractor};
pub use policy::ApprovalPolicy;
pub use registry::{Outcome, Verdict, VisitedRegistry};
pub use result::{CrawlReport, CrawlStats};
