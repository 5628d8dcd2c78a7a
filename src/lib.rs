//! Docscore: scorecard regression auditing for documentation pull requests.
//!
//! Reads the score tables a review bot posts on pull requests, tracks each
//! article's scores across the review, and reports files whose total score
//! went up or down between the first and the latest scorecard, or which are
//! still below the passing score. A second command counts Markdown files
//! added, modified and removed by recently merged pull requests.

pub mod changes;
pub mod classify;
pub mod cli;
pub mod eligibility;
pub mod github;
pub mod history;
pub mod parser;
pub mod report;
pub mod scan;
pub mod types;

pub use changes::{ChangeScanReport, ChangeScanSpec, FileChangeTally, count_changes};
pub use classify::{
    DEFAULT_MIN_SCORE, FieldChange, FieldTag, FileDiff, PrAudit, ScoreField, Trend, classify,
};
pub use cli::{Command, OutputOptions, parse_args};
pub use eligibility::is_eligible;
pub use github::GitHub;
pub use history::{FileHistory, ScoreHistory};
pub use parser::{ScoreParseError, ScoreRow, ScoreTableParser};
pub use report::{PrReport, RunStatistics, ScoreScanReport};
pub use scan::{DEFAULT_BOT_LOGIN, ScoreScanSpec, scan_scores};
pub use types::{
    Comment, FileChange, FileStatus, Forge, OutputFormat, PrState, PullRequest, PullRequestQuery,
    Repo, RepoError, Score,
};
