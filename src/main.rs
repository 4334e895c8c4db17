use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use swingtrack::replay::{read_updates, replay, ReplayBounds};
use swingtrack::{Config, FileStore, HistoryStore, SessionSummary};

/// Record and review exercise sessions
#[derive(Parser)]
#[command(name = "swingtrack")]
#[command(version)]
#[command(about = "Exercise session recorder", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run recorded samples (NDJSON) through a session
    Replay {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Session start in ms (defaults to the first sample)
        #[arg(long)]
        start: Option<i64>,

        /// Session end in ms (defaults to the last sample)
        #[arg(long)]
        end: Option<i64>,

        /// Append the summary to the history
        #[arg(long)]
        save: bool,
    },

    /// List saved sessions, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one saved session (0 = newest)
    Show { index: usize },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let history_dir = config.history.resolved_dir();

    match cli.command {
        Commands::Replay {
            input,
            start,
            end,
            save,
        } => {
            let file = File::open(&input)?;
            let updates = read_updates(BufReader::new(file))?;
            let bounds = ReplayBounds {
                start_ms: start,
                end_ms: end,
            };

            let summary = replay(&config, &updates, bounds)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if save {
                let mut history = HistoryStore::new(FileStore::new(&history_dir));
                history.append(summary)?;
            }
        }
        Commands::History { json } => {
            let history = HistoryStore::new(FileStore::new(&history_dir));
            let newest_first: Vec<SessionSummary> = history.load_all().into_iter().rev().collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&newest_first)?);
            } else if newest_first.is_empty() {
                println!("No sessions recorded");
            } else {
                for (index, summary) in newest_first.iter().enumerate() {
                    println!(
                        "{:>3}  {}  {}  {} cycles",
                        index,
                        format_timestamp(summary.start_time),
                        format_duration(summary.duration_ms),
                        summary.cycle_count
                    );
                }
            }
        }
        Commands::Show { index } => {
            let history = HistoryStore::new(FileStore::new(&history_dir));
            let records = history.load_all();
            let summary = records
                .iter()
                .rev()
                .nth(index)
                .ok_or_else(|| format!("No session at index {} ({} saved)", index, records.len()))?;

            println!("Started:            {}", format_timestamp(summary.start_time));
            println!("Duration:           {}", format_duration(summary.duration_ms));
            println!("Cycles:             {}", summary.cycle_count);
            println!("Average frequency:  {:.2} /s", summary.average_frequency);
            println!("Max frequency:      {:.1} /s", summary.max_frequency);
            println!("Average heart rate: {:.1} bpm", summary.average_heart_rate);
            println!("Max heart rate:     {:.1} bpm", summary.max_heart_rate);
        }
    }

    Ok(())
}

/// MM:SS
fn format_duration(duration_ms: i64) -> String {
    let seconds = duration_ms.max(0) / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}
