use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Owner assumed when a repository is given by bare name.
pub const DEFAULT_OWNER: &str = "MicrosoftDocs";

/// Error produced when a repository identifier cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Empty,
    TooManySegments(String),
    InvalidSegment(String),
    InvalidUrl(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::Empty => write!(f, "repository must not be empty"),
            RepoError::TooManySegments(s) => {
                write!(f, "expected 'owner/repo' or 'repo', got '{s}'")
            }
            RepoError::InvalidSegment(s) => write!(f, "invalid owner or repository name '{s}'"),
            RepoError::InvalidUrl(s) => {
                write!(f, "expected https://github.com/owner/repo, got '{s}'")
            }
        }
    }
}

impl std::error::Error for RepoError {}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Repo {
    owner: String,
    name: String,
}

fn validate_segment(segment: &str) -> Result<(), RepoError> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(RepoError::InvalidSegment(segment.to_string()))
    }
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        validate_segment(&owner)?;
        validate_segment(&name)?;
        Ok(Self { owner, name })
    }

    /// Parses `owner/repo`, or a bare `repo` which is placed under
    /// [`DEFAULT_OWNER`].
    pub fn parse(s: &str) -> Result<Self, RepoError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RepoError::Empty);
        }

        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [name] => Self::new(DEFAULT_OWNER, *name),
            [owner, name] => Self::new(*owner, *name),
            _ => Err(RepoError::TooManySegments(s.to_string())),
        }
    }

    /// Parses a repository URL such as `https://github.com/owner/repo`.
    /// Trailing path segments (e.g. `/pulls`) are ignored.
    pub fn parse_url(s: &str) -> Result<Self, RepoError> {
        let url = url::Url::parse(s).map_err(|_| RepoError::InvalidUrl(s.to_string()))?;
        if url.host_str() != Some("github.com") {
            return Err(RepoError::InvalidUrl(s.to_string()));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [owner, name, ..] => Self::new(*owner, name.trim_end_matches(".git")),
            _ => Err(RepoError::InvalidUrl(s.to_string())),
        }
    }

    /// Accepts any of the forms understood by [`Repo::parse`] and
    /// [`Repo::parse_url`].
    pub fn from_arg(s: &str) -> Result<Self, RepoError> {
        if s.trim_start().starts_with("https://") {
            Self::parse_url(s.trim())
        } else {
            Self::parse(s)
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One scorecard evaluation of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub total: u32,
    pub words_phrases: u32,
    pub correctness: u32,
    pub clarity: u32,
}

impl Score {
    pub const fn new(total: u32, words_phrases: u32, correctness: u32, clarity: u32) -> Self {
        Self {
            total,
            words_phrases,
            correctness,
            clarity,
        }
    }
}

/// An issue comment on a pull request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub author: Option<String>,
    pub body: Option<String>,
}

impl Comment {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            body: Some(body.into()),
        }
    }

    pub fn is_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }
}

/// The parts of a pull request the scanners look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or("unknown")
    }
}

/// Status of a file within a pull request diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Other,
}

/// A file touched by a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

/// Which pull requests to list.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestQuery {
    pub state: PrState,
    pub base: Option<String>,
}

impl PullRequestQuery {
    pub fn open() -> Self {
        Self {
            state: PrState::Open,
            base: None,
        }
    }

    pub fn closed_into(base: impl Into<String>) -> Self {
        Self {
            state: PrState::Closed,
            base: Some(base.into()),
        }
    }
}

/// Number of pull requests requested per listing page.
pub const PAGE_SIZE: u8 = 100;

/// Abstraction over the hosting service.
///
/// Pages are numbered from 1; an empty page marks the end of the listing.
/// Comments are returned oldest first. Errors are transport failures and are
/// fatal for the run.
#[async_trait]
pub trait Forge {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        query: &PullRequestQuery,
        page: u32,
    ) -> Result<Vec<PullRequest>>;

    async fn list_comments(&self, repo: &Repo, number: u64) -> Result<Vec<Comment>>;

    async fn list_files(&self, repo: &Repo, number: u64) -> Result<Vec<FileChange>>;
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_parse_owner_and_name() {
        let repo = Repo::parse("contoso/docs").unwrap();
        assert_eq!(repo.owner(), "contoso");
        assert_eq!(repo.name(), "docs");
        assert_eq!(repo.to_string(), "contoso/docs");
    }

    #[test]
    fn test_repo_parse_bare_name_uses_default_owner() {
        let repo = Repo::parse("azure-docs").unwrap();
        assert_eq!(repo.owner(), DEFAULT_OWNER);
        assert_eq!(repo.name(), "azure-docs");
    }

    #[test]
    fn test_repo_parse_rejects_bad_input() {
        assert_eq!(Repo::parse(""), Err(RepoError::Empty));
        assert!(matches!(
            Repo::parse("a/b/c"),
            Err(RepoError::TooManySegments(_))
        ));
        assert!(matches!(
            Repo::parse("owner/"),
            Err(RepoError::InvalidSegment(_))
        ));
        assert!(matches!(
            Repo::parse("own er/repo"),
            Err(RepoError::InvalidSegment(_))
        ));
    }

    #[test]
    fn test_repo_parse_url() {
        let repo = Repo::parse_url("https://github.com/dotnet/docs/pulls").unwrap();
        assert_eq!(repo, Repo::new("dotnet", "docs").unwrap());

        let repo = Repo::parse_url("https://github.com/dotnet/docs.git").unwrap();
        assert_eq!(repo.name(), "docs");

        assert!(Repo::parse_url("https://gitlab.com/dotnet/docs").is_err());
        assert!(Repo::parse_url("https://github.com/dotnet").is_err());
    }

    #[test]
    fn test_repo_from_arg_dispatches_on_scheme() {
        assert_eq!(
            Repo::from_arg("https://github.com/o/r").unwrap(),
            Repo::from_arg("o/r").unwrap()
        );
    }

    #[test]
    fn test_comment_is_by_exact_login() {
        let comment = Comment::new("acrolinxatmsft1", "body");
        assert!(comment.is_by("acrolinxatmsft1"));
        assert!(!comment.is_by("AcrolinxAtMsft1"));
        assert!(!Comment::default().is_by("acrolinxatmsft1"));
    }
}
