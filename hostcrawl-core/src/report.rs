// Report generation from a finished crawl

use hostcrawl_scanner::{CrawlReport, CrawlStats, Outcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const RESULTS_HEADER: &str = "Found the following successful and approved urls:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub stats: CrawlStats,
    pub elapsed_ms: u128,
}

impl ReportData {
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut rejected: Vec<String> = report
            .entries
            .iter()
            .filter(|(_, outcome)| **outcome == Outcome::Rejected)
            .map(|(url, _)| url.clone())
            .collect();
        rejected.sort();

        Self {
            accepted: report
                .accepted_urls()
                .into_iter()
                .map(str::to_string)
                .collect(),
            rejected,
            stats: report.stats.clone(),
            elapsed_ms: report.elapsed.as_millis(),
        }
    }
}

/// Header line followed by one accepted URL per line.
pub fn generate_text_report(report: &CrawlReport) -> String {
    let mut text = String::new();
    text.push_str(RESULTS_HEADER);
    text.push('\n');
    for url in report.accepted_urls() {
        text.push_str(url);
        text.push('\n');
    }
    text
}

pub fn generate_json_report(report: &CrawlReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ReportData::from_report(report))
}

pub fn generate_report(
    report: &CrawlReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
