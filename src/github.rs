use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{
    Octocrab,
    models::{self, repos::DiffEntryStatus},
    params,
};
use tracing::debug;

use crate::types::{
    Comment, FileChange, FileStatus, Forge, PAGE_SIZE, PrState, PullRequest, PullRequestQuery,
    Repo,
};

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(var)
            && !token.trim().is_empty()
        {
            return Ok(token.trim().to_string());
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("Failed to run 'gh auth token'")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// [`Forge`] backed by the GitHub REST API.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates an authenticated client using available credentials.
    pub fn from_env() -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self::new(client))
    }
}

fn convert_pull_request(pr: models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        labels: pr
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|label| label.name)
            .collect(),
        author: pr.user.map(|user| user.login),
        url: pr.html_url.map(|url| url.to_string()),
        merged_at: pr.merged_at,
    }
}

fn convert_status(status: &DiffEntryStatus) -> FileStatus {
    match status {
        DiffEntryStatus::Added => FileStatus::Added,
        DiffEntryStatus::Modified => FileStatus::Modified,
        DiffEntryStatus::Removed => FileStatus::Removed,
        _ => FileStatus::Other,
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        query: &PullRequestQuery,
        page: u32,
    ) -> Result<Vec<PullRequest>> {
        let state = match query.state {
            PrState::Open => params::State::Open,
            PrState::Closed => params::State::Closed,
        };

        let pulls = self.client.pulls(repo.owner(), repo.name());
        let mut request = pulls.list().state(state).per_page(PAGE_SIZE).page(page);
        if let Some(base) = &query.base {
            request = request.base(base.as_str());
        }

        let result = request.send().await?;
        debug!(%repo, page, count = result.items.len(), "listed pull requests");

        Ok(result.items.into_iter().map(convert_pull_request).collect())
    }

    async fn list_comments(&self, repo: &Repo, number: u64) -> Result<Vec<Comment>> {
        let first = self
            .client
            .issues(repo.owner(), repo.name())
            .list_comments(number)
            .per_page(PAGE_SIZE)
            .send()
            .await?;
        let comments = self.client.all_pages(first).await?;
        debug!(%repo, number, count = comments.len(), "listed comments");

        Ok(comments
            .into_iter()
            .map(|comment| Comment {
                author: Some(comment.user.login),
                body: comment.body,
            })
            .collect())
    }

    async fn list_files(&self, repo: &Repo, number: u64) -> Result<Vec<FileChange>> {
        let first = self
            .client
            .pulls(repo.owner(), repo.name())
            .list_files(number)
            .await?;
        let files = self.client.all_pages(first).await?;

        Ok(files
            .into_iter()
            .map(|file| FileChange {
                status: convert_status(&file.status),
                filename: file.filename,
            })
            .collect())
    }
}
