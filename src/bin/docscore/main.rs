mod display;

use docscore::{Command, GitHub, count_changes, parse_args, scan_scores};
use display::{Style, announce_scan, display_change_report, display_score_report};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let (command, options) = match parse_args(std::env::args()) {
        Ok(result) => result,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let forge = GitHub::from_env()?;
    let mut stdout = std::io::stdout();

    match command {
        Command::Scores(spec) => {
            tracing::info!(repo = %spec.repo, "scanning pull requests for scorecards");
            announce_scan(&spec.repo, options.format, &mut stdout)?;
            let report = scan_scores(&spec, &forge).await?;
            let style = Style::for_stdout(options.color);
            display_score_report(&report, options.format, &style, &mut stdout)?;
        }
        Command::Changes(spec) => {
            tracing::info!(repo = %spec.repo, base = %spec.base, "counting merged file changes");
            announce_scan(&spec.repo, options.format, &mut stdout)?;
            let report = count_changes(&spec, &forge).await?;
            display_change_report(&report, options.format, &mut stdout)?;
        }
    }

    Ok(())
}
