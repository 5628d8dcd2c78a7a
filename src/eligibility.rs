//! Decides which pull requests are worth scanning for score tables.

use crate::types::PullRequest;

/// Title markers that take a pull request out of review.
pub const EXCLUDED_TITLE_MARKERS: &[&str] = &["[stale]", "do not merge", "do not publish"];

/// Label carried by pull requests awaiting a human reviewer.
pub const REVIEW_LABEL: &str = "needs-human-review";

/// Returns true when the title carries no exclusion marker and the labels
/// include [`REVIEW_LABEL`]. Both checks ignore case.
pub fn is_eligible<S: AsRef<str>>(title: &str, labels: &[S]) -> bool {
    let title = title.to_lowercase();
    if EXCLUDED_TITLE_MARKERS
        .iter()
        .any(|marker| title.contains(marker))
    {
        return false;
    }

    labels
        .iter()
        .any(|label| label.as_ref().eq_ignore_ascii_case(REVIEW_LABEL))
}

pub fn is_pr_eligible(pr: &PullRequest) -> bool {
    is_eligible(&pr.title, &pr.labels)
}
