// File: ./src/cli.rs
//! Command-line surface: argument definitions and command handlers.
//!
//! Handlers write user-facing output to the supplied writer and report
//! failures on stderr; the returned `Outcome` becomes the process exit code.
use crate::activity::{ActivitySource, GitHubActivity};
use crate::config::Config;
use crate::context::AppContext;
use crate::digest::render_day;
use crate::error::{AggregateError, StatuslyError};
use crate::model::{Category, DateWindow, format_date, parse_date};
use crate::report::{FetchFailurePolicy, Report, ReportRequest, build_report};
use crate::storage::{FileRecordStore, RecordStore, append};
use crate::summarize::{OpenAiSummarizer, Summarizer};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Result of a command as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "statusly",
    about = "Daily status log with GitHub activity and AI range summaries",
    version
)]
pub struct Cli {
    /// Use a different directory for config and data.
    #[arg(long, short, global = true)]
    pub root: Option<PathBuf>,

    /// Print debug logging to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage daily log entries.
    Log {
        #[command(subcommand)]
        action: LogCommand,
    },

    /// Show the logged work for a given date.
    Show {
        /// Date of the log to view (default: today).
        #[arg(long)]
        log_date: Option<String>,
    },

    /// Summarize a date range of logs plus GitHub activity.
    Summarize {
        /// First day of the range, YYYY-MM-DD.
        #[arg(long)]
        start: String,

        /// Last day of the range (inclusive), YYYY-MM-DD.
        #[arg(long)]
        end: String,

        /// Skip the GitHub pull request search.
        #[arg(long)]
        no_github: bool,

        /// Print the merged digest instead of asking for an AI summary.
        #[arg(long)]
        no_ai: bool,

        /// Fail instead of falling back to logs when GitHub cannot be reached.
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// Add a status log entry.
    Add {
        /// Things you are currently working on.
        #[arg(long)]
        doing: Vec<String>,

        /// Tasks you've completed.
        #[arg(long)]
        done: Vec<String>,

        /// Anything blocking your progress.
        #[arg(long)]
        blocker: Vec<String>,

        /// Miscellaneous activities (calls, side work, etc.).
        #[arg(long)]
        misc: Vec<String>,

        /// Log date (default: today).
        #[arg(long)]
        log_date: Option<String>,
    },
}

/// Variable lookup used for credential overrides.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn resolve_date(arg: Option<&str>) -> Result<NaiveDate, StatuslyError> {
    match arg {
        Some(text) => parse_date(text),
        None => Ok(today()),
    }
}

pub async fn run(
    cli: Cli,
    ctx: &dyn AppContext,
    env: EnvLookup<'_>,
    out: &mut dyn Write,
) -> Result<Outcome> {
    match cli.command {
        Commands::Log {
            action:
                LogCommand::Add {
                    doing,
                    done,
                    blocker,
                    misc,
                    log_date,
                },
        } => {
            let entries = [
                (Category::Doing, doing),
                (Category::Done, done),
                (Category::Blocker, blocker),
                (Category::Misc, misc),
            ];
            add_entries(ctx, log_date.as_deref(), entries, out)
        }
        Commands::Show { log_date } => show(ctx, log_date.as_deref(), out),
        Commands::Summarize {
            start,
            end,
            no_github,
            no_ai,
            strict,
        } => {
            let options = SummarizeOptions {
                github: !no_github,
                ai: !no_ai,
                strict,
            };
            summarize(ctx, env, &start, &end, options, out).await
        }
    }
}

fn add_entries(
    ctx: &dyn AppContext,
    log_date: Option<&str>,
    entries: [(Category, Vec<String>); 4],
    out: &mut dyn Write,
) -> Result<Outcome> {
    let date = match resolve_date(log_date) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(Outcome::Failure);
        }
    };

    let store = FileRecordStore::from_context(ctx)?;
    // A damaged file is reported, not overwritten; only aggregation treats it as empty.
    append(&store, date, entries)?;

    writeln!(out, "✅ Log updated for {}", format_date(date))?;
    Ok(Outcome::Success)
}

fn show(ctx: &dyn AppContext, log_date: Option<&str>, out: &mut dyn Write) -> Result<Outcome> {
    let date = match resolve_date(log_date) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(Outcome::Failure);
        }
    };

    let store = FileRecordStore::from_context(ctx)?;
    let record = store.get(date)?;
    match render_day(date, &record) {
        Some(text) => writeln!(out, "{}", text)?,
        None => writeln!(out, "📭 No log found for {}", format_date(date))?,
    }
    Ok(Outcome::Success)
}

#[derive(Debug, Clone, Copy)]
pub struct SummarizeOptions {
    pub github: bool,
    pub ai: bool,
    pub strict: bool,
}

pub async fn summarize(
    ctx: &dyn AppContext,
    env: EnvLookup<'_>,
    start: &str,
    end: &str,
    options: SummarizeOptions,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let window = match DateWindow::parse(start, end) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(Outcome::Failure);
        }
    };

    let config = Config::load_or_default(ctx)?.with_env_overrides(env);
    let timeout = config.http_timeout();

    let github = if options.github {
        let client = GitHubActivity::new(config.github.clone(), timeout)?;
        if let Err(e) = client.check_credentials() {
            eprintln!("❌ {} (set GITHUB_USER/GITHUB_TOKEN or pass --no-github)", e);
            return Ok(Outcome::Failure);
        }
        Some(client)
    } else {
        None
    };

    let summarizer = if options.ai {
        match OpenAiSummarizer::new(config.openai.clone(), timeout) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("❌ {} (set OPENAI_API_KEY or pass --no-ai)", e);
                return Ok(Outcome::Failure);
            }
        }
    } else {
        None
    };

    let store = FileRecordStore::from_context(ctx)?;
    let request = ReportRequest {
        window,
        fetch_failure: if options.strict {
            FetchFailurePolicy::Abort
        } else {
            FetchFailurePolicy::DegradeToLogs
        },
    };

    let report = build_report(
        &store,
        github.as_ref().map(|g| g as &dyn ActivitySource),
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
        request,
    )
    .await;

    match report {
        Err(AggregateError::InvalidRange(e) | AggregateError::MissingCredentials(e)) => {
            eprintln!("❌ {}", e);
            Ok(Outcome::Failure)
        }
        Err(AggregateError::ExternalFetchFailed { source, .. }) => {
            eprintln!("❌ {}", source);
            Ok(Outcome::Failure)
        }
        Ok(Report::Empty) => {
            eprintln!("📭 No logs in range {}", window);
            Ok(Outcome::Failure)
        }
        Ok(Report::Ready {
            digest,
            summary,
            warnings,
        }) => {
            for w in &warnings {
                eprintln!("⚠️  {}", w);
            }
            match summary {
                Some(Ok(text)) => {
                    writeln!(out, "\n🧠 Summary for {}:\n", window)?;
                    writeln!(out, "{}", text.trim_end())?;
                    Ok(Outcome::Success)
                }
                Some(Err(e)) => {
                    eprintln!("❌ {}", e);
                    writeln!(out, "\n📋 Merged log for {}:\n", window)?;
                    write!(out, "{}", digest)?;
                    Ok(Outcome::Failure)
                }
                None => {
                    writeln!(out, "\n📋 Merged log for {}:\n", window)?;
                    write!(out, "{}", digest)?;
                    Ok(Outcome::Success)
                }
            }
        }
    }
}
