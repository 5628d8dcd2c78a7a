use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use chrono_humanize::HumanTime;
use colored::Colorize;
use docscore::{
    ChangeScanReport, FieldChange, FieldTag, FileDiff, OutputFormat, PrReport, Repo,
    RunStatistics, ScoreScanReport, Trend,
};
use serde::Serialize;

const RULE_WIDTH: usize = 80;

/// Presentation settings resolved against the actual stdout.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
    pub rule_width: usize,
}

impl Style {
    pub fn for_stdout(color_allowed: bool) -> Self {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return Self {
                color: false,
                rule_width: RULE_WIDTH,
            };
        }

        let rule_width = terminal_size::terminal_size()
            .map(|(w, _)| (w.0 as usize).min(RULE_WIDTH))
            .unwrap_or(RULE_WIDTH);
        colored::control::set_override(color_allowed);
        Self {
            color: color_allowed,
            rule_width,
        }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self {
            color: false,
            rule_width: RULE_WIDTH,
        }
    }
}

fn paint(pair: String, tag: FieldTag) -> String {
    match tag {
        FieldTag::ImprovedPassing => pair.green().to_string(),
        FieldTag::ImprovedFailing | FieldTag::UnchangedFailing => pair.yellow().to_string(),
        FieldTag::Regressed => pair.red().to_string(),
        FieldTag::UnchangedPassing => pair,
    }
}

fn format_field(change: &FieldChange, style: &Style) -> String {
    let pair = format!("{}->{}", change.first, change.last);
    let pair = if style.color {
        paint(pair, change.tag)
    } else {
        pair
    };
    format!("{}: {}", change.field.label(), pair)
}

fn write_file_line<W: Write>(
    file: &FileDiff,
    min_score: u32,
    style: &Style,
    writer: &mut W,
) -> Result<()> {
    let fields: Vec<String> = file
        .field_changes(min_score)
        .iter()
        .map(|change| format_field(change, style))
        .collect();
    writeln!(writer, "{}: {}", file.file_name(), fields.join(" "))?;
    Ok(())
}

fn write_pr_section<W: Write>(
    pr: &PrReport,
    min_score: u32,
    style: &Style,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}: \"{}\" by {}", pr.number, pr.title, pr.author)?;
    writeln!(writer, "{}", "-".repeat(style.rule_width))?;
    for file in &pr.files {
        write_file_line(file, min_score, style, writer)?;
    }
    Ok(())
}

fn write_score_summary<W: Write>(
    stats: &RunStatistics,
    min_score: u32,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "Scanned {} of {} PRs",
        stats.scanned_prs, stats.total_prs
    )?;
    writeln!(
        writer,
        "\t{} files have less than {}",
        stats.below_threshold, min_score
    )?;
    writeln!(
        writer,
        "\t{} files have scores that went down",
        stats.decreased
    )?;
    writeln!(writer, "\t{} files have scores that went up", stats.increased)?;
    writeln!(
        writer,
        "\t{} files have scores that didn't change",
        stats.unchanged
    )?;
    writeln!(writer, "\tTotal scores changed = {}", stats.total_changed())?;
    Ok(())
}

#[derive(Serialize)]
struct FileJson<'a> {
    path: &'a str,
    trend: Trend,
    below_threshold: bool,
    fields: [FieldChange; 4],
}

#[derive(Serialize)]
struct PrJson<'a> {
    number: u64,
    title: &'a str,
    author: &'a str,
    url: Option<&'a str>,
    files: Vec<FileJson<'a>>,
}

#[derive(Serialize)]
struct StatisticsJson<'a> {
    #[serde(flatten)]
    counts: &'a RunStatistics,
    total_changed: usize,
}

#[derive(Serialize)]
struct ScoreReportJson<'a> {
    repo: String,
    min_score: u32,
    pull_requests: Vec<PrJson<'a>>,
    statistics: StatisticsJson<'a>,
}

fn score_report_json(report: &ScoreScanReport) -> ScoreReportJson<'_> {
    let pull_requests = report
        .prs
        .iter()
        .map(|pr| PrJson {
            number: pr.number,
            title: &pr.title,
            author: &pr.author,
            url: pr.url.as_deref(),
            files: pr
                .files
                .iter()
                .map(|file| FileJson {
                    path: &file.path,
                    trend: file.trend,
                    below_threshold: file.below_threshold,
                    fields: file.field_changes(report.min_score),
                })
                .collect(),
        })
        .collect();

    ScoreReportJson {
        repo: report.repo.to_string(),
        min_score: report.min_score,
        pull_requests,
        statistics: StatisticsJson {
            counts: &report.statistics,
            total_changed: report.statistics.total_changed(),
        },
    }
}

/// Names the repository up front, before any request is made. JSON output
/// stays a single document, so nothing is written in that format.
pub fn announce_scan<W: Write>(repo: &Repo, format: OutputFormat, writer: &mut W) -> Result<()> {
    if format == OutputFormat::Text {
        writeln!(writer, "Running on {repo}")?;
        writer.flush()?;
    }
    Ok(())
}

pub fn display_score_report<W: Write>(
    report: &ScoreScanReport,
    format: OutputFormat,
    style: &Style,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &score_report_json(report))?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for pr in &report.prs {
                write_pr_section(pr, report.min_score, style, writer)?;
            }
            write_score_summary(&report.statistics, report.min_score, writer)?;
        }
    }
    Ok(())
}

pub fn display_change_report<W: Write>(
    report: &ChangeScanReport,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            writeln!(
                writer,
                "{} PRs merged into {} since {} ({})",
                report.merged_prs,
                report.base,
                report.since.format("%Y-%m-%d"),
                HumanTime::from(report.since)
            )?;
            writeln!(writer, "New Files: {}", report.tally.added)?;
            writeln!(writer, "Updated Files: {}", report.tally.modified)?;
            writeln!(writer, "Deleted Files: {}", report.tally.removed)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use docscore::{FileChangeTally, Score};

    use super::*;

    fn repo() -> Repo {
        Repo::new("contoso", "docs").unwrap()
    }

    fn sample_report() -> ScoreScanReport {
        ScoreScanReport {
            repo: repo(),
            min_score: 80,
            prs: vec![PrReport {
                number: 101,
                title: "Update install guide".to_string(),
                author: "writer".to_string(),
                url: None,
                files: vec![
                    FileDiff::new(
                        "articles/install.md",
                        Score::new(65, 10, 40, 22),
                        Score::new(90, 12, 40, 20),
                        80,
                    ),
                    FileDiff::new(
                        "articles/overview.md",
                        Score::new(95, 90, 90, 90),
                        Score::new(60, 90, 90, 90),
                        80,
                    ),
                ],
            }],
            statistics: RunStatistics {
                total_prs: 5,
                scanned_prs: 2,
                below_threshold: 1,
                increased: 1,
                decreased: 1,
                unchanged: 3,
            },
        }
    }

    fn render(report: &ScoreScanReport, format: OutputFormat, style: &Style) -> String {
        let mut out = Vec::new();
        display_score_report(report, format, style, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_report_layout() {
        let text = render(&sample_report(), OutputFormat::Text, &Style::plain());
        let expected = format!(
            "\n\
             101: \"Update install guide\" by writer\n\
             {}\n\
             install.md: Total: 65->90 Words: 10->12 Correctness: 40->40 Clarity: 22->20\n\
             overview.md: Total: 95->60 Words: 90->90 Correctness: 90->90 Clarity: 90->90\n\
             \n\
             Scanned 2 of 5 PRs\n\
             \t1 files have less than 80\n\
             \t1 files have scores that went down\n\
             \t1 files have scores that went up\n\
             \t3 files have scores that didn't change\n\
             \tTotal scores changed = 2\n",
            "-".repeat(80)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_colour_follows_field_tag() {
        colored::control::set_override(true);
        let style = Style {
            color: true,
            rule_width: 10,
        };
        let text = render(&sample_report(), OutputFormat::Text, &style);

        assert!(text.contains(&"-".repeat(10)));
        assert!(!text.contains(&"-".repeat(11)));
        assert!(text.contains("Total: \x1b[32m65->90\x1b[0m"));
        assert!(text.contains(&format!("Words: {}", "10->12".yellow())));
        assert!(text.contains(&format!("Correctness: {}", "40->40".yellow())));
        assert!(text.contains(&format!("Clarity: {}", "22->20".red())));
        assert!(text.contains("overview.md: Total: \x1b[31m95->60\x1b[0m Words: 90->90 "));
    }

    #[test]
    fn test_no_sections_when_nothing_reportable() {
        let report = ScoreScanReport {
            prs: Vec::new(),
            ..sample_report()
        };
        let text = render(&report, OutputFormat::Text, &Style::plain());
        assert!(!text.contains(" by "));
        assert!(text.contains("Scanned 2 of 5 PRs"));
    }

    #[test]
    fn test_json_report() {
        let json = render(&sample_report(), OutputFormat::Json, &Style::plain());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["repo"], "contoso/docs");
        assert_eq!(value["statistics"]["total_changed"], 2);
        assert_eq!(value["statistics"]["unchanged"], 3);

        let file = &value["pull_requests"][0]["files"][1];
        assert_eq!(file["path"], "articles/overview.md");
        assert_eq!(file["trend"], "decreased");
        assert_eq!(file["below_threshold"], true);
        assert_eq!(file["fields"][0]["tag"], "regressed");
        assert_eq!(file["fields"][1]["field"], "words");
    }

    #[test]
    fn test_announce_scan_only_in_text_format() {
        let mut out = Vec::new();
        announce_scan(&repo(), OutputFormat::Text, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Running on contoso/docs\n");

        let mut out = Vec::new();
        announce_scan(&repo(), OutputFormat::Json, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_change_report_text() {
        let report = ChangeScanReport {
            repo: repo(),
            base: "main".to_string(),
            since: Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(),
            merged_prs: 4,
            tally: FileChangeTally {
                added: 2,
                modified: 7,
                removed: 1,
            },
        };

        let mut out = Vec::new();
        display_change_report(&report, OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("4 PRs merged into main since 2024-02-29 ("));
        assert!(text.ends_with("New Files: 2\nUpdated Files: 7\nDeleted Files: 1\n"));
    }
}
