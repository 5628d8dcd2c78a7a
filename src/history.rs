//! Per-pull-request score history, built from the review bot's comments.

use indexmap::IndexMap;

use crate::{
    parser::{ScoreParseError, ScoreTableParser},
    types::{Comment, Score},
};

/// Every snapshot recorded for one file, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHistory<'a> {
    pub path: &'a str,
    pub snapshots: &'a [Score],
}

impl<'a> FileHistory<'a> {
    pub fn first(&self) -> Option<&'a Score> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&'a Score> {
        self.snapshots.last()
    }
}

/// Ordered map from file path to its snapshots.
///
/// Files are kept in the order they were first seen and snapshots in the
/// order they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreHistory {
    files: IndexMap<String, Vec<Score>>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the history from the comments authored by `bot_login`, in the
    /// order given. Comments with no body contribute nothing.
    pub fn from_comments<'c, I>(
        comments: I,
        bot_login: &str,
        parser: &ScoreTableParser,
    ) -> Result<Self, ScoreParseError>
    where
        I: IntoIterator<Item = &'c Comment>,
    {
        let mut history = Self::new();

        for comment in comments.into_iter().filter(|c| c.is_by(bot_login)) {
            let Some(body) = comment.body.as_deref().filter(|b| !b.is_empty()) else {
                continue;
            };
            for row in parser.rows(body) {
                let row = row?;
                history.push(row.path, row.score);
            }
        }

        Ok(history)
    }

    pub fn push(&mut self, path: impl Into<String>, score: Score) {
        self.files.entry(path.into()).or_default().push(score);
    }

    pub fn get(&self, path: &str) -> Option<FileHistory<'_>> {
        self.files
            .get_key_value(path)
            .map(|(path, snapshots)| FileHistory { path, snapshots })
    }

    pub fn iter(&self) -> impl Iterator<Item = FileHistory<'_>> {
        self.files
            .iter()
            .map(|(path, snapshots)| FileHistory { path, snapshots })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Repo;

    const BOT: &str = "acrolinxatmsft1";

    fn parser() -> ScoreTableParser {
        ScoreTableParser::new(&Repo::new("o", "r").unwrap())
    }

    fn table(rows: &[(&str, u32)]) -> String {
        rows.iter()
            .map(|(path, total)| {
                format!(
                    "| [{path}](https://github.com/o/r/blob/abc/{path}) | [{total}](https://h/scorecards/id) | 1 | 2 | 3 |"
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn totals(history: &ScoreHistory, path: &str) -> Vec<u32> {
        history
            .get(path)
            .map(|f| f.snapshots.iter().map(|s| s.total).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_groups_snapshots_by_file_in_comment_order() {
        let comments = vec![
            Comment::new(BOT, table(&[("a.md", 60), ("b.md", 90)])),
            Comment::new(BOT, table(&[("a.md", 75)])),
            Comment::new(BOT, table(&[("b.md", 85), ("a.md", 82)])),
        ];

        let history = ScoreHistory::from_comments(&comments, BOT, &parser()).unwrap();

        assert_eq!(totals(&history, "a.md"), [60, 75, 82]);
        assert_eq!(totals(&history, "b.md"), [90, 85]);
    }

    #[test]
    fn test_keeps_first_encounter_order_of_files() {
        let comments = vec![
            Comment::new(BOT, table(&[("z.md", 1)])),
            Comment::new(BOT, table(&[("a.md", 2), ("z.md", 3)])),
            Comment::new(BOT, table(&[("m.md", 4)])),
        ];

        let history = ScoreHistory::from_comments(&comments, BOT, &parser()).unwrap();
        let order: Vec<&str> = history.iter().map(|f| f.path).collect();
        assert_eq!(order, ["z.md", "a.md", "m.md"]);
    }

    #[test]
    fn test_ignores_comments_from_other_authors() {
        let comments = vec![
            Comment::new("reviewer", table(&[("a.md", 10)])),
            Comment::new(BOT, table(&[("a.md", 70)])),
            Comment {
                author: None,
                body: Some(table(&[("a.md", 20)])),
            },
            Comment::new(BOT, table(&[("a.md", 88)])),
        ];

        let history = ScoreHistory::from_comments(&comments, BOT, &parser()).unwrap();
        assert_eq!(totals(&history, "a.md"), [70, 88]);
    }

    #[test]
    fn test_skips_empty_and_missing_bodies() {
        let comments = vec![
            Comment::new(BOT, ""),
            Comment {
                author: Some(BOT.to_string()),
                body: None,
            },
            Comment::new(BOT, "Scorecard is being generated..."),
        ];

        let history = ScoreHistory::from_comments(&comments, BOT, &parser()).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_no_bot_comments_gives_empty_history() {
        let history = ScoreHistory::from_comments(&Vec::new(), BOT, &parser()).unwrap();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_paths_are_case_sensitive() {
        let comments = vec![Comment::new(BOT, table(&[("A.md", 1), ("a.md", 2)]))];
        let history = ScoreHistory::from_comments(&comments, BOT, &parser()).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_get_returns_first_and_last_snapshot() {
        let mut history = ScoreHistory::new();
        history.push("a.md", Score::new(60, 1, 2, 3));
        history.push("b.md", Score::new(10, 1, 2, 3));
        history.push("a.md", Score::new(70, 1, 2, 3));
        history.push("a.md", Score::new(90, 1, 2, 3));

        let file = history.get("a.md").unwrap();
        assert_eq!(file.path, "a.md");
        assert_eq!(file.first().map(|s| s.total), Some(60));
        assert_eq!(file.last().map(|s| s.total), Some(90));
        assert_eq!(history.len(), 2);
        assert!(history.get("missing.md").is_none());
    }

    #[test]
    fn test_propagates_parse_errors() {
        let body = "[a.md](https://github.com/o/r/blob/abc/a.md) | [4294967296](https://h/scorecards/id) | 1 | 2 | 3 |";
        let comments = vec![Comment::new(BOT, body)];
        assert!(ScoreHistory::from_comments(&comments, BOT, &parser()).is_err());
    }
}
