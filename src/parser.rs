//! Extraction of score-table rows from review bot comments.
//!
//! The review bot posts a Markdown table with one row per article:
//!
//! ```text
//! [intro.md](https://github.com/owner/repo/blob/<sha>/docs/intro.md) | [72](https://host/api/v1/checking/scorecards/<id>) | 10 | 40 | 22 |
//! ```
//!
//! Rows are extracted in three stages. A single compiled pattern finds every
//! non-overlapping row-shaped fragment; rows whose linked file is not
//! Markdown are dropped; the four digit captures are converted to integers.
//! Only Markdown articles are audited, so scorecards for other file types
//! are intentionally ignored.

use std::{ffi::OsStr, fmt, num::ParseIntError, path::Path};

use regex::{Captures, Regex};

use crate::types::{Repo, Score};

/// Error raised when a digit capture does not fit the score type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub path: String,
    pub field: &'static str,
    pub value: String,
    pub source: ParseIntError,
}

impl fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} score '{}' for {}: {}",
            self.field, self.value, self.path, self.source
        )
    }
}

impl std::error::Error for ScoreParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// One accepted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    /// Link text shown for the article.
    pub label: String,
    /// Repository-relative path taken from the blob link.
    pub path: String,
    pub score: Score,
}

/// Returns true when `path` has a `.md` extension, ignoring case.
pub fn is_markdown_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Capture groups of one matched row, before conversion.
struct RawRow<'a> {
    label: &'a str,
    path: &'a str,
    total: &'a str,
    words_phrases: &'a str,
    correctness: &'a str,
    clarity: &'a str,
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

impl<'a> RawRow<'a> {
    fn from_captures(caps: Captures<'a>) -> Self {
        Self {
            label: group(&caps, "label"),
            path: group(&caps, "path"),
            total: group(&caps, "total"),
            words_phrases: group(&caps, "words"),
            correctness: group(&caps, "correctness"),
            clarity: group(&caps, "clarity"),
        }
    }

    fn is_markdown(&self) -> bool {
        is_markdown_path(self.path)
    }

    fn field(&self, field: &'static str, value: &str) -> Result<u32, ScoreParseError> {
        value.parse().map_err(|source| ScoreParseError {
            path: self.path.to_string(),
            field,
            value: value.to_string(),
            source,
        })
    }

    fn into_row(self) -> Result<ScoreRow, ScoreParseError> {
        let score = Score {
            total: self.field("total", self.total)?,
            words_phrases: self.field("words + phrases", self.words_phrases)?,
            correctness: self.field("correctness", self.correctness)?,
            clarity: self.field("clarity", self.clarity)?,
        };
        Ok(ScoreRow {
            label: self.label.to_string(),
            path: self.path.to_string(),
            score,
        })
    }
}

/// Finds score-table rows that link into one repository.
#[derive(Debug, Clone)]
pub struct ScoreTableParser {
    pattern: Regex,
}

impl ScoreTableParser {
    pub fn new(repo: &Repo) -> Self {
        let pattern = format!(
            concat!(
                r"\[(?P<label>[^\]]+)\]",
                r"\(https://github\.com/{owner}/{name}/blob/[A-Za-z0-9]+/(?P<path>[^\]\s]+?)\)",
                r" *\| *\[(?P<total>\d+)\]\(https://[^)\s]*/scorecards/[A-Za-z0-9-]+\)",
                r" *\| *(?P<words>\d+) *\| *(?P<correctness>\d+) *\| *(?P<clarity>\d+) *\|",
            ),
            owner = regex::escape(repo.owner()),
            name = regex::escape(repo.name()),
        );
        let pattern = Regex::new(&pattern).expect("score table pattern is valid");
        Self { pattern }
    }

    /// Yields every Markdown row in `body`, in order of appearance.
    ///
    /// The iterator is single-pass. A body without rows yields nothing.
    pub fn rows<'a>(
        &'a self,
        body: &'a str,
    ) -> impl Iterator<Item = Result<ScoreRow, ScoreParseError>> + 'a {
        self.pattern
            .captures_iter(body)
            .map(RawRow::from_captures)
            .filter(RawRow::is_markdown)
            .map(RawRow::into_row)
    }
}
