use anyhow::{Context, Result};
use clap::ArgMatches;
use hostcrawl_core::crawl::{CrawlOptions, execute_crawl};
use hostcrawl_core::report::{ReportFormat, generate_report, save_report};
use hostcrawl_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use hostcrawl_scanner::{CrawlDiagnostic, DiagnosticCallback, ESCAPE_FRAGMENT_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, warn};
use url::Url;

// Helper functions for crawl handler

/// Load and parse URLs from a seeds file. Blank lines and `#` comments are skipped.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let content = fs::read_to_string(&expanded)
        .with_context(|| format!("Failed to read seeds file {}", expanded))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect())
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Positional seeds first, then the seeds file.
pub fn collect_seeds(positional: &[String], seeds_file: Option<&PathBuf>) -> Result<Vec<String>> {
    let mut seeds = positional.to_vec();
    if let Some(path) = seeds_file {
        seeds.extend(load_urls_from_file(path)?);
    }
    Ok(seeds)
}

pub fn escape_fragment_setting(disabled: bool, suffix: Option<&String>) -> Option<String> {
    if disabled {
        None
    } else {
        Some(
            suffix
                .cloned()
                .unwrap_or_else(|| ESCAPE_FRAGMENT_SUFFIX.to_string()),
        )
    }
}

pub fn verbosity_level(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

pub fn build_crawl_options(matches: &ArgMatches) -> Result<CrawlOptions> {
    let positional: Vec<String> = matches
        .get_many::<String>("SEEDS")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let seeds = collect_seeds(&positional, matches.get_one::<PathBuf>("seeds-file"))?;

    let schemes = matches
        .get_many::<String>("scheme")
        .map(|values| values.cloned().collect());

    Ok(CrawlOptions {
        seeds,
        timeout_secs: matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        escape_fragment: escape_fragment_setting(
            matches.get_flag("no-escape-fragment"),
            matches.get_one::<String>("escape-fragment"),
        ),
        schemes,
        show_progress: matches.get_flag("progress"),
    })
}

pub async fn handle_crawl(matches: &ArgMatches) -> Result<()> {
    let options = build_crawl_options(matches)?;
    if options.seeds.is_empty() {
        debug!("No seeds given, nothing to crawl");
        return Ok(());
    }

    let format = matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let diagnostic_callback: DiagnosticCallback = Arc::new(|diagnostic: &CrawlDiagnostic| {
        eprintln!("{}", diagnostic);
    });

    let report = execute_crawl(options, Some(diagnostic_callback))
        .await
        .context("Failed to set up the HTTP client")?;

    let rendered = generate_report(&report, format).context("Failed to render report")?;
    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report saved to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
