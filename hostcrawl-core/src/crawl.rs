use hostcrawl_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use hostcrawl_scanner::{
    CrawlDiagnostic, CrawlReport, Crawler, DiagnosticCallback, ESCAPE_FRAGMENT_SUFFIX, Fetcher,
    LinkExtractor, ProgressCallback, ScanError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seeds: Vec<String>,
    pub timeout_secs: u64,
    /// Suffix appended to outbound requests, `None` to disable
    pub escape_fragment: Option<String>,
    /// Approved schemes; `None` keeps http and https
    pub schemes: Option<Vec<String>>,
    pub show_progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            escape_fragment: Some(ESCAPE_FRAGMENT_SUFFIX.to_string()),
            schemes: None,
            show_progress: false,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl over HTTP with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    diagnostic_callback: Option<DiagnosticCallback>,
) -> Result<CrawlReport, ScanError> {
    let crawler = Crawler::with_timeout(options.timeout_secs)?;
    Ok(execute_crawl_with(crawler, options, diagnostic_callback).await)
}

/// Execute a crawl on an already built crawler; its fetcher and extractor are kept.
pub async fn execute_crawl_with<F: Fetcher, X: LinkExtractor>(
    crawler: Crawler<F, X>,
    options: CrawlOptions,
    diagnostic_callback: Option<DiagnosticCallback>,
) -> CrawlReport {
    let CrawlOptions {
        seeds,
        escape_fragment,
        schemes,
        show_progress,
        ..
    } = options;

    if seeds.is_empty() {
        return CrawlReport::empty();
    }

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = crawler.with_escape_fragment(escape_fragment);
    if let Some(schemes) = schemes {
        crawler = crawler.with_schemes(schemes);
    }

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let dispatched = Arc::new(AtomicUsize::new(0));
        let progress_callback: ProgressCallback = Arc::new(move |in_flight: usize, url: String| {
            let count = dispatched.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "Crawling... {} dispatched, {} in flight: {}",
                count,
                in_flight,
                extract_url_path(&url)
            ));
        });
        crawler = crawler.with_progress_callback(progress_callback);
    }

    if let Some(callback) = diagnostic_callback {
        // Keep diagnostic lines from tearing the spinner.
        let callback: DiagnosticCallback = match progress_bar.clone() {
            Some(pb) => Arc::new(move |diagnostic: &CrawlDiagnostic| {
                pb.suspend(|| callback(diagnostic));
            }),
            None => callback,
        };
        crawler = crawler.with_diagnostic_callback(callback);
    }

    let report = crawler.crawl(seeds.as_slice()).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }
    info!(
        "Crawl complete! {} accepted of {} dispatched",
        report.stats.accepted, report.stats.dispatched
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_send_escape_fragment() {
        let options = CrawlOptions::default();
        assert_eq!(options.escape_fragment.as_deref(), Some("?__escaped_fragment__"));
        assert_eq!(options.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(options.schemes.is_none());
        assert!(!options.show_progress);
    }
}
