//! Tally of Markdown files added, modified and removed by recently merged
//! pull requests.

use anyhow::{Context, Result};
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    parser::is_markdown_path,
    types::{FileChange, FileStatus, Forge, PullRequestQuery, Repo},
};

pub const DEFAULT_MONTHS: u32 = 3;
pub const DEFAULT_BRANCH: &str = "main";

/// Parameters of a change count.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeScanSpec {
    pub repo: Repo,
    pub base: String,
    /// Size of the look-back window.
    pub months: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileChangeTally {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
}

impl FileChangeTally {
    /// Counts `change` if it is a Markdown file that was added, modified or
    /// removed. Anything else is ignored.
    pub fn record(&mut self, change: &FileChange) {
        if !is_markdown_path(&change.filename) {
            return;
        }
        match change.status {
            FileStatus::Added => self.added += 1,
            FileStatus::Modified => self.modified += 1,
            FileStatus::Removed => self.removed += 1,
            FileStatus::Other => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeScanReport {
    pub repo: Repo,
    pub base: String,
    pub since: DateTime<Utc>,
    pub merged_prs: usize,
    pub tally: FileChangeTally,
}

pub fn window_start(now: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    now.checked_sub_months(Months::new(months))
        .with_context(|| format!("Cannot go back {months} months from {now}"))
}

/// Counts Markdown changes in pull requests merged within the last
/// `spec.months` months.
pub async fn count_changes<F>(spec: &ChangeScanSpec, forge: &F) -> Result<ChangeScanReport>
where
    F: Forge + Sync,
{
    let since = window_start(Utc::now(), spec.months)?;
    count_changes_since(spec, since, forge).await
}

/// Like [`count_changes`] with an explicit window start.
///
/// Closed pull requests are listed newest first; paging stops at the first
/// page that is empty or on which every pull request was merged before
/// `since`.
pub async fn count_changes_since<F>(
    spec: &ChangeScanSpec,
    since: DateTime<Utc>,
    forge: &F,
) -> Result<ChangeScanReport>
where
    F: Forge + Sync,
{
    let query = PullRequestQuery::closed_into(&spec.base);
    let mut tally = FileChangeTally::default();
    let mut merged_prs = 0;
    let mut page = 1;

    loop {
        let batch = forge
            .list_pull_requests(&spec.repo, &query, page)
            .await
            .with_context(|| format!("Failed to list pull requests for {} (page {page})", spec.repo))?;
        debug!(page, count = batch.len(), "fetched closed pull request page");

        let all_before_window = batch
            .iter()
            .all(|pr| pr.merged_at.is_some_and(|merged| merged < since));
        if batch.is_empty() || all_before_window {
            break;
        }

        for pr in batch
            .iter()
            .filter(|pr| pr.merged_at.is_some_and(|merged| merged >= since))
        {
            let files = forge
                .list_files(&spec.repo, pr.number)
                .await
                .with_context(|| format!("Failed to list files for PR #{}", pr.number))?;
            debug!(number = pr.number, files = files.len(), "counting files");

            merged_prs += 1;
            for file in &files {
                tally.record(file);
            }
        }

        page += 1;
    }

    Ok(ChangeScanReport {
        repo: spec.repo.clone(),
        base: spec.base.clone(),
        since,
        merged_prs,
        tally,
    })
}
