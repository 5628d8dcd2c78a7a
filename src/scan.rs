//! Score scan driver: pages pull requests and audits each eligible one.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    classify::{PrAudit, classify},
    eligibility::is_pr_eligible,
    history::ScoreHistory,
    parser::ScoreTableParser,
    report::{PrReport, RunStatistics, ScoreScanReport},
    types::{Comment, Forge, PullRequest, PullRequestQuery, Repo},
};

/// Login of the bot that posts scorecard tables.
pub const DEFAULT_BOT_LOGIN: &str = "acrolinxatmsft1";

/// Parameters of a score regression scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreScanSpec {
    pub repo: Repo,
    pub min_score: u32,
    pub bot_login: String,
    /// Stop after this many pull requests have been listed.
    pub limit: Option<usize>,
}

/// Builds and classifies the score history of one pull request's comments.
pub fn audit_comments(
    comments: &[Comment],
    bot_login: &str,
    parser: &ScoreTableParser,
    min_score: u32,
) -> Result<Option<PrAudit>> {
    let history = ScoreHistory::from_comments(comments, bot_login, parser)?;
    Ok(classify(&history, min_score))
}

async fn audit_pull_request<F>(
    spec: &ScoreScanSpec,
    parser: &ScoreTableParser,
    forge: &F,
    pr: &PullRequest,
) -> Result<Option<PrAudit>>
where
    F: Forge + Sync,
{
    let comments = forge
        .list_comments(&spec.repo, pr.number)
        .await
        .with_context(|| format!("Failed to fetch comments for PR #{}", pr.number))?;

    audit_comments(&comments, &spec.bot_login, parser, spec.min_score)
        .with_context(|| format!("Failed to read score tables on PR #{}", pr.number))
}

/// Walks every open pull request and compares first and last scorecards.
///
/// Pull requests are handled one at a time in listing order. Any forge
/// error aborts the scan and discards what was gathered so far.
pub async fn scan_scores<F>(spec: &ScoreScanSpec, forge: &F) -> Result<ScoreScanReport>
where
    F: Forge + Sync,
{
    let parser = ScoreTableParser::new(&spec.repo);
    let query = PullRequestQuery::open();
    let mut statistics = RunStatistics::default();
    let mut prs = Vec::new();
    let mut page = 1;

    'pages: loop {
        let batch = forge
            .list_pull_requests(&spec.repo, &query, page)
            .await
            .with_context(|| format!("Failed to list pull requests for {} (page {page})", spec.repo))?;
        debug!(page, count = batch.len(), "fetched pull request page");

        if batch.is_empty() {
            break;
        }

        for pr in batch {
            if spec.limit.is_some_and(|limit| statistics.total_prs >= limit) {
                debug!(limit = ?spec.limit, "pull request limit reached");
                break 'pages;
            }
            statistics.record_seen();

            if !is_pr_eligible(&pr) {
                debug!(number = pr.number, "skipping ineligible pull request");
                continue;
            }

            let Some(audit) = audit_pull_request(spec, &parser, forge, &pr).await? else {
                debug!(number = pr.number, "no file scored more than once");
                continue;
            };

            info!(
                number = pr.number,
                files = audit.files.len(),
                "scanned pull request"
            );
            statistics.record(&audit);
            prs.extend(PrReport::from_audit(&pr, &audit));
        }

        page += 1;
    }

    Ok(ScoreScanReport {
        repo: spec.repo.clone(),
        min_score: spec.min_score,
        prs,
        statistics,
    })
}
