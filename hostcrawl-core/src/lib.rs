pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, execute_crawl, execute_crawl_with, extract_url_path};
pub use report::{ReportFormat, generate_report, save_report};
