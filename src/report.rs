//! Run-wide counters and the per-PR results handed to the display layer.

use serde::Serialize;

use crate::{
    classify::{FileDiff, PrAudit, Trend},
    types::{PullRequest, Repo},
};

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Every pull request listed, eligible or not.
    pub total_prs: usize,
    /// Pull requests with at least one file scored twice.
    pub scanned_prs: usize,
    pub below_threshold: usize,
    pub increased: usize,
    pub decreased: usize,
    pub unchanged: usize,
}

impl RunStatistics {
    pub fn record_seen(&mut self) {
        self.total_prs += 1;
    }

    /// Counts a scanned pull request and each of its diffed files.
    pub fn record(&mut self, audit: &PrAudit) {
        self.scanned_prs += 1;

        for file in &audit.files {
            if file.below_threshold {
                self.below_threshold += 1;
            }
            match file.trend {
                Trend::Increased => self.increased += 1,
                Trend::Decreased => self.decreased += 1,
                Trend::Unchanged => self.unchanged += 1,
            }
        }
    }

    pub fn total_changed(&self) -> usize {
        self.increased + self.decreased
    }
}

/// A pull request with at least one reportable file.
#[derive(Debug, Clone, PartialEq)]
pub struct PrReport {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: Option<String>,
    pub files: Vec<FileDiff>,
}

impl PrReport {
    /// Returns `None` when nothing in the audit is worth reporting.
    pub fn from_audit(pr: &PullRequest, audit: &PrAudit) -> Option<Self> {
        let files: Vec<FileDiff> = audit.reportable().cloned().collect();
        if files.is_empty() {
            return None;
        }

        Some(Self {
            number: pr.number,
            title: pr.title.trim().to_string(),
            author: pr.author_name().to_string(),
            url: pr.url.clone(),
            files,
        })
    }
}

/// Everything the score scan produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreScanReport {
    pub repo: Repo,
    pub min_score: u32,
    pub prs: Vec<PrReport>,
    pub statistics: RunStatistics,
}
