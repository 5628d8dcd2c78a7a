use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::{
    changes::{ChangeScanSpec, DEFAULT_BRANCH, DEFAULT_MONTHS},
    classify::DEFAULT_MIN_SCORE,
    scan::{DEFAULT_BOT_LOGIN, ScoreScanSpec},
    types::{OutputFormat, Repo},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Args, Debug, Clone)]
struct ScoresArgs {
    /// Repository as OWNER/REPO, a bare REPO (owner MicrosoftDocs) or a GitHub URL
    #[arg(value_name = "OWNER/REPO")]
    pub repo: String,

    /// Total score below which a file is flagged
    #[arg(long, default_value_t = DEFAULT_MIN_SCORE, value_name = "SCORE")]
    pub min_score: u32,

    /// Login of the bot that posts scorecards
    #[arg(long, default_value = DEFAULT_BOT_LOGIN, value_name = "LOGIN")]
    pub bot: String,

    /// Stop after listing this many pull requests
    #[arg(short = 'L', long, value_name = "NUM")]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct ChangesArgs {
    /// Repository as OWNER/REPO, a bare REPO (owner MicrosoftDocs) or a GitHub URL
    #[arg(value_name = "OWNER/REPO")]
    pub repo: String,

    /// Only count pull requests merged within this many months
    #[arg(
        long,
        default_value_t = DEFAULT_MONTHS,
        value_name = "NUM",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub months: u32,

    /// Base branch the pull requests were merged into
    #[arg(long, default_value = DEFAULT_BRANCH, value_name = "BRANCH")]
    pub branch: String,
}

#[derive(Subcommand, Debug, Clone)]
enum CommandArgs {
    /// Report scorecard regressions on open pull requests
    Scores(ScoresArgs),
    /// Count Markdown files changed by recently merged pull requests
    Changes(ChangesArgs),
}

#[derive(Parser, Debug)]
#[command(
    name = "docscore",
    about = "Audit documentation scorecard changes across GitHub pull requests"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Never colour text output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// What to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scores(ScoreScanSpec),
    Changes(ChangeScanSpec),
}

/// How to present the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Colour is allowed; the caller still checks for a terminal.
    pub color: bool,
}

fn parse_repo(repo: &str) -> Result<Repo> {
    Repo::from_arg(repo).map_err(|e| anyhow::anyhow!("Invalid repository '{}': {}", repo, e))
}

fn build_command(command: CommandArgs) -> Result<Command> {
    match command {
        CommandArgs::Scores(args) => {
            let bot_login = args.bot.trim().to_string();
            if bot_login.is_empty() {
                anyhow::bail!("--bot must not be empty");
            }
            Ok(Command::Scores(ScoreScanSpec {
                repo: parse_repo(&args.repo)?,
                min_score: args.min_score,
                bot_login,
                limit: args.limit,
            }))
        }
        CommandArgs::Changes(args) => {
            let base = args.branch.trim().to_string();
            if base.is_empty() {
                anyhow::bail!("--branch must not be empty");
            }
            Ok(Command::Changes(ChangeScanSpec {
                repo: parse_repo(&args.repo)?,
                base,
                months: args.months,
            }))
        }
    }
}

/// Parses command-line arguments into the command to run and its output
/// options.
///
/// Clap errors (including `--help` and `--version`) are returned unchanged so
/// the caller can downcast them and pick an exit code.
pub fn parse_args<I, T>(args: I) -> Result<(Command, OutputOptions)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    let options = OutputOptions {
        format: cli.format,
        color: !cli.no_color,
    };
    Ok((build_command(cli.command)?, options))
}
