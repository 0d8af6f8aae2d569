use std::process;
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use rhythm::cli::{Cli, Command};
use rhythm::config::Config;
use rhythm::pipeline::{self, TASK};
use rhythm::report;
use rhythm::store::{diff, HistoryStore};
use rhythm::util::format_bytes;
use rhythm::Error;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(err: Error) -> ! {
    error!(task = TASK, kind = err.kind(), "{err}");
    process::exit(1);
}

fn parse_at(value: &str) -> Result<DateTime<Local>, String> {
    humantime::parse_rfc3339_weak(value)
        .map(|time: SystemTime| DateTime::<Utc>::from(time).with_timezone(&Local))
        .map_err(|e| format!("invalid --at value '{value}': {e}"))
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = Config::from_run_args(&args).unwrap_or_else(|e| fail(e));
            let summary = pipeline::run(&config, &Local::now()).unwrap_or_else(|e| fail(e));

            println!(
                "captured {} files ({}), history holds {} points",
                summary.files,
                format_bytes(summary.total_size),
                summary.retained
            );
        }
        Command::History(args) => {
            let config = Config::from_config_args(&args.config).unwrap_or_else(|e| fail(e));
            let history = HistoryStore::new(&config.storage.history)
                .load()
                .unwrap_or_else(|e| fail(e));

            print!(
                "{}",
                report::render_history(&history, Utc::now().timestamp_millis(), args.json)
            );
            if args.json {
                println!();
            }
        }
        Command::Prune(args) => {
            let config = Config::from_config_args(&args.config).unwrap_or_else(|e| fail(e));
            let now = match args.at.as_deref().map(parse_at) {
                Some(Ok(at)) => at,
                Some(Err(message)) => {
                    eprintln!("{message}");
                    process::exit(1);
                }
                None => Local::now(),
            };

            let summary = pipeline::prune(&config, &now, args.dry_run).unwrap_or_else(|e| fail(e));

            if args.dry_run {
                println!(
                    "would remove {} of {} points",
                    summary.removed,
                    summary.removed + summary.retained
                );
            } else {
                println!("removed {} points, {} remain", summary.removed, summary.retained);
            }
        }
        Command::Diff(args) => {
            let config = Config::from_config_args(&args.config).unwrap_or_else(|e| fail(e));
            let history = HistoryStore::new(&config.storage.history)
                .load()
                .unwrap_or_else(|e| fail(e));

            let Some((from, to)) = diff::latest_pair(&history) else {
                eprintln!("Need at least 2 points to compare. Run 'rhythm run' a few times.");
                process::exit(1);
            };

            print!("{}", report::table::render_diff(&diff::compare_points(from, to)));
        }
    }
}
