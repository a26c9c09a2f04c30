use crate::diagnostic::{Action, CrawlDiagnostic, DiagnosticCallback};
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::links::{HtmlLinkExtractor, LinkExtractor};
use crate::normalize::{Origin, canonical, canonicalize, resolve_link};
use crate::policy::ApprovalPolicy;
use crate::registry::{Verdict, VisitedRegistry};
use crate::result::{CrawlReport, CrawlStats};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};
use url::Url;

/// Appended to every outbound request so servers pre-render script-driven pages.
/// Never part of a stored URL.
pub const ESCAPE_FRAGMENT_SUFFIX: &str = "?__escaped_fragment__";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Called on each dispatch with the number of fetches in flight and the URL.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Links found on one fetched page, reported once per dispatched task.
#[derive(Debug)]
struct CandidateBatch {
    origin: Origin,
    links: Vec<String>,
}

enum VerifyRequest {
    /// Ask to own the page a fetch resolved to
    Claim {
        requested: String,
        canonical: Url,
        reply: oneshot::Sender<Verdict>,
    },
    /// The fetch failed at the transport level
    Failed { url: String },
}

pub struct Crawler<F = HttpFetcher, X = HtmlLinkExtractor> {
    fetcher: Arc<F>,
    extractor: Arc<X>,
    escape_fragment: Option<String>,
    schemes: Option<Vec<String>>,
    channel_capacity: usize,
    progress_callback: Option<ProgressCallback>,
    diagnostic_callback: Option<DiagnosticCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::new()?))
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::with_timeout(timeout_secs)?))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlLinkExtractor),
            escape_fragment: Some(ESCAPE_FRAGMENT_SUFFIX.to_string()),
            schemes: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            progress_callback: None,
            diagnostic_callback: None,
        }
    }
}

impl<F: Fetcher, X: LinkExtractor> Crawler<F, X> {
    pub fn with_link_extractor<Y: LinkExtractor>(self, extractor: Y) -> Crawler<F, Y> {
        Crawler {
            fetcher: self.fetcher,
            extractor: Arc::new(extractor),
            escape_fragment: self.escape_fragment,
            schemes: self.schemes,
            channel_capacity: self.channel_capacity,
            progress_callback: self.progress_callback,
            diagnostic_callback: self.diagnostic_callback,
        }
    }

    /// Suffix appended to outbound requests; `None` sends URLs untouched.
    pub fn with_escape_fragment(mut self, suffix: Option<String>) -> Self {
        self.escape_fragment = suffix.filter(|s| !s.is_empty());
        self
    }

    /// Replace the approved schemes (`http` and `https` by default).
    pub fn with_schemes<S>(mut self, schemes: S) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
    {
        self.schemes = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_diagnostic_callback(mut self, callback: DiagnosticCallback) -> Self {
        self.diagnostic_callback = Some(callback);
        self
    }

    fn apply_schemes(&self, policy: ApprovalPolicy) -> ApprovalPolicy {
        match &self.schemes {
            Some(schemes) => policy.with_schemes(schemes.iter().cloned()),
            None => policy,
        }
    }

    /// Crawl everything reachable from `seeds` on the seeds' hosts.
    ///
    /// Returns once every dispatched fetch has reported back. Per-URL failures
    /// never abort the crawl; they go to the diagnostic callback.
    pub async fn crawl<S: AsRef<str>>(&self, seeds: &[S]) -> CrawlReport {
        if seeds.is_empty() {
            return CrawlReport::empty();
        }

        let start = Instant::now();
        info!("Starting crawl of {} seed(s)", seeds.len());

        let (policy, invalid) = ApprovalPolicy::from_seeds(seeds);
        let policy = self.apply_schemes(policy);

        let (candidate_tx, mut candidate_rx) = mpsc::channel(self.channel_capacity);
        let (verify_tx, mut verify_rx) = mpsc::channel(self.channel_capacity);

        let task = FetchTask {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            escape_fragment: self.escape_fragment.as_deref().map(Arc::from),
            candidates: candidate_tx,
            verify: verify_tx,
            diagnostics: self.diagnostic_callback.clone(),
        };

        let mut frontier = Frontier {
            policy,
            registry: VisitedRegistry::new(),
            in_flight: 0,
            stats: CrawlStats::default(),
            task,
            tasks: JoinSet::new(),
            running: HashMap::new(),
            progress: self.progress_callback.clone(),
            diagnostics: self.diagnostic_callback.clone(),
        };

        for (seed, error) in invalid {
            frontier.report(CrawlDiagnostic::new(error, Action::ParsingSeed, seed));
        }
        for seed in seeds {
            if let Ok(url) = Url::parse(seed.as_ref()) {
                frontier.offer(url);
            }
        }

        while frontier.in_flight > 0 {
            tokio::select! {
                Some(batch) = candidate_rx.recv() => frontier.absorb(batch),
                Some(request) = verify_rx.recv() => frontier.verify(request),
                Some(joined) = frontier.tasks.join_next_with_id() => frontier.joined(joined),
            }
        }

        let Frontier {
            registry, stats, ..
        } = frontier;
        debug_assert!(registry.is_settled(), "crawl ended with pending URLs");
        let elapsed = start.elapsed();
        info!(
            "Completed in {:?}: {} accepted, {} rejected, {} failed",
            elapsed, stats.accepted, stats.rejected, stats.failed
        );

        CrawlReport {
            entries: registry.into_entries(),
            stats,
            elapsed,
        }
    }
}

fn emit(callback: &Option<DiagnosticCallback>, diagnostic: CrawlDiagnostic) {
    debug!("{}", diagnostic);
    if let Some(callback) = callback {
        callback(&diagnostic);
    }
}

/// State owned by the orchestrator loop. Nothing else reads or writes it.
struct Frontier<F, X> {
    policy: ApprovalPolicy,
    registry: VisitedRegistry,
    in_flight: usize,
    stats: CrawlStats,
    task: FetchTask<F, X>,
    tasks: JoinSet<()>,
    /// URL each running fetch task was dispatched for
    running: HashMap<Id, String>,
    progress: Option<ProgressCallback>,
    diagnostics: Option<DiagnosticCallback>,
}

impl<F: Fetcher, X: LinkExtractor> Frontier<F, X> {
    fn report(&self, diagnostic: CrawlDiagnostic) {
        emit(&self.diagnostics, diagnostic);
    }

    /// Admit a URL: dispatch a fetch for it unless it was seen before or is not approved.
    fn offer(&mut self, mut url: Url) {
        canonicalize(&mut url);

        if self.registry.contains(url.as_str()) {
            self.stats.duplicates += 1;
            return;
        }
        if !self.policy.approves(&url) {
            debug!("Not approved: {}", url);
            self.registry.reject(url.as_str());
            self.stats.rejected += 1;
            return;
        }

        self.registry.claim(url.as_str());
        self.in_flight += 1;
        self.stats.dispatched += 1;
        debug!("Dispatching {} ({} in flight)", url, self.in_flight);

        if let Some(ref callback) = self.progress {
            callback(self.in_flight, url.to_string());
        }
        let handle = self.tasks.spawn(self.task.clone().run(url.clone()));
        self.running.insert(handle.id(), url.into());
    }

    fn absorb(&mut self, batch: CandidateBatch) {
        let CandidateBatch { origin, links } = batch;
        for link in links {
            match resolve_link(&link, &origin) {
                Ok(url) => self.offer(url),
                Err(e) => self.report(CrawlDiagnostic::new(e, Action::ParsingChild, link)),
            }
        }
        // The batch closes out the task that produced it.
        self.in_flight -= 1;
    }

    fn verify(&mut self, request: VerifyRequest) {
        match request {
            VerifyRequest::Claim {
                requested,
                canonical,
                reply,
            } => {
                let approved = self.policy.approves(&canonical);
                let verdict = self
                    .registry
                    .settle(&requested, canonical.as_str(), approved);
                debug!("{} -> {}: {:?}", requested, canonical, verdict);

                match verdict {
                    Verdict::Accepted => self.stats.accepted += 1,
                    Verdict::Rejected => self.stats.rejected += 1,
                    Verdict::Duplicate => self.stats.duplicates += 1,
                }

                if reply.send(verdict).is_err() {
                    // Its JoinError closes the task out.
                    warn!("Fetch task for {} exited before its verdict", requested);
                }
            }
            VerifyRequest::Failed { url } => {
                self.registry.reject(&url);
                self.stats.failed += 1;
                self.in_flight -= 1;
            }
        }
    }

    /// A fetch task ended. One that panicked or was cancelled never sent its
    /// closing message, so its slot is released here.
    fn joined(&mut self, joined: std::result::Result<(Id, ()), JoinError>) {
        let error = match joined {
            Ok((id, ())) => {
                self.running.remove(&id);
                return;
            }
            Err(error) => error,
        };

        let url = self.running.remove(&error.id()).unwrap_or_default();
        warn!("Fetch task for {} died: {}", url, error);
        if self.registry.outcome(&url).is_some_and(|o| !o.is_terminal()) {
            self.registry.reject(&url);
            self.stats.failed += 1;
        }
        self.report(CrawlDiagnostic::new(error, Action::Getting, url));
        self.in_flight -= 1;
    }
}

/// One fetch: request, verify the resolved page with the orchestrator, report links.
struct FetchTask<F, X> {
    fetcher: Arc<F>,
    extractor: Arc<X>,
    escape_fragment: Option<Arc<str>>,
    candidates: mpsc::Sender<CandidateBatch>,
    verify: mpsc::Sender<VerifyRequest>,
    diagnostics: Option<DiagnosticCallback>,
}

impl<F, X> Clone for FetchTask<F, X> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            escape_fragment: self.escape_fragment.clone(),
            candidates: self.candidates.clone(),
            verify: self.verify.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

impl<F: Fetcher, X: LinkExtractor> FetchTask<F, X> {
    fn target(&self, url: &Url) -> String {
        match self.escape_fragment.as_deref() {
            Some(suffix) => format!("{}{}", url, suffix),
            None => url.to_string(),
        }
    }

    async fn run(self, requested: Url) {
        let target = self.target(&requested);

        let page = match self.fetcher.fetch(&target).await {
            Ok(page) => page,
            Err(e) => {
                emit(
                    &self.diagnostics,
                    CrawlDiagnostic::new(e, Action::Getting, requested.as_str()),
                );
                let failed = VerifyRequest::Failed {
                    url: requested.to_string(),
                };
                if self.verify.send(failed).await.is_err() {
                    warn!("Orchestrator gone while reporting failure of {}", requested);
                }
                return;
            }
        };

        let canonical = canonical(&page.final_url);
        let (reply_tx, reply_rx) = oneshot::channel();
        let claim = VerifyRequest::Claim {
            requested: requested.to_string(),
            canonical: canonical.clone(),
            reply: reply_tx,
        };
        if self.verify.send(claim).await.is_err() {
            warn!("Orchestrator gone while verifying {}", canonical);
            return;
        }

        let verdict = reply_rx.await.unwrap_or(Verdict::Duplicate);
        let links = if verdict == Verdict::Accepted {
            self.extractor.extract(&page.body)
        } else {
            Vec::new()
        };
        debug!("{} yielded {} link(s)", canonical, links.len());

        let batch = CandidateBatch {
            origin: Origin::of(&canonical),
            links,
        };
        if self.candidates.send(batch).await.is_err() {
            warn!("Orchestrator gone while reporting links of {}", canonical);
        }
    }
}
