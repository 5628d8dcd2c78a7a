//! First-versus-last comparison of score histories.

use serde::Serialize;

use crate::{history::ScoreHistory, types::Score};

/// Default passing score for an article.
pub const DEFAULT_MIN_SCORE: u32 = 80;

/// Direction of a file's total score between its first and last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increased,
    Decreased,
    Unchanged,
}

impl Trend {
    pub fn between(first: u32, last: u32) -> Self {
        if first > last {
            Trend::Decreased
        } else if first < last {
            Trend::Increased
        } else {
            Trend::Unchanged
        }
    }
}

/// Presentation tag for one `first->last` pair of a score field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTag {
    ImprovedPassing,
    ImprovedFailing,
    Regressed,
    UnchangedPassing,
    UnchangedFailing,
}

impl FieldTag {
    pub fn between(first: u32, last: u32, min_score: u32) -> Self {
        let passing = last >= min_score;
        match Trend::between(first, last) {
            Trend::Increased if passing => FieldTag::ImprovedPassing,
            Trend::Increased => FieldTag::ImprovedFailing,
            Trend::Decreased => FieldTag::Regressed,
            Trend::Unchanged if passing => FieldTag::UnchangedPassing,
            Trend::Unchanged => FieldTag::UnchangedFailing,
        }
    }
}

/// The four score fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Total,
    Words,
    Correctness,
    Clarity,
}

impl ScoreField {
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Total,
        ScoreField::Words,
        ScoreField::Correctness,
        ScoreField::Clarity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreField::Total => "Total",
            ScoreField::Words => "Words",
            ScoreField::Correctness => "Correctness",
            ScoreField::Clarity => "Clarity",
        }
    }

    pub fn of(&self, score: &Score) -> u32 {
        match self {
            ScoreField::Total => score.total,
            ScoreField::Words => score.words_phrases,
            ScoreField::Correctness => score.correctness,
            ScoreField::Clarity => score.clarity,
        }
    }
}

/// One score field compared across a file's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: ScoreField,
    pub first: u32,
    pub last: u32,
    pub tag: FieldTag,
}

/// Outcome for a file with at least two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub first: Score,
    pub last: Score,
    pub trend: Trend,
    pub below_threshold: bool,
}

impl FileDiff {
    pub fn new(path: impl Into<String>, first: Score, last: Score, min_score: u32) -> Self {
        Self {
            path: path.into(),
            first,
            last,
            trend: Trend::between(first.total, last.total),
            below_threshold: last.total < min_score,
        }
    }

    /// A file is reported when its score moved or it is still failing.
    pub fn is_reportable(&self) -> bool {
        self.below_threshold || self.trend != Trend::Unchanged
    }

    /// Final path component, used as the display name.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn field_changes(&self, min_score: u32) -> [FieldChange; 4] {
        ScoreField::ALL.map(|field| {
            let first = field.of(&self.first);
            let last = field.of(&self.last);
            FieldChange {
                field,
                first,
                last,
                tag: FieldTag::between(first, last, min_score),
            }
        })
    }
}

/// All diffable files of one pull request, in history order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrAudit {
    pub files: Vec<FileDiff>,
}

impl PrAudit {
    pub fn reportable(&self) -> impl Iterator<Item = &FileDiff> {
        self.files.iter().filter(|f| f.is_reportable())
    }

    pub fn has_reportable(&self) -> bool {
        self.reportable().next().is_some()
    }
}

/// Compares the first and last snapshot of every file seen at least twice.
///
/// Returns `None` when no file has two snapshots, meaning the pull request
/// was not scanned. Intermediate snapshots do not affect the outcome.
pub fn classify(history: &ScoreHistory, min_score: u32) -> Option<PrAudit> {
    let files: Vec<FileDiff> = history
        .iter()
        .filter(|file| file.snapshots.len() >= 2)
        .filter_map(|file| {
            let first = file.first()?;
            let last = file.last()?;
            Some(FileDiff::new(file.path, *first, *last, min_score))
        })
        .collect();

    if files.is_empty() {
        None
    } else {
        Some(PrAudit { files })
    }
}
