//! Organization contributions CLI
//!
//! Prints, for every contributor to a GitHub organization, the total number of
//! changed lines across the organization's repositories.
//!
//! The token is taken from `GITHUB_TOKEN` when set. Otherwise it is prompted
//! for without echo on a terminal, or read as one line from piped stdin.
//! Logs go to stderr so that stdout carries only the ranking.

mod output;

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use contributions_collector::{
    CollectorConfig, CollectorService, GitHubClientImpl, RepositoryFilter, Strategy, TracingEvents,
};
use dialoguer::Password;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GitHub organization to summarize
    organization: String,

    /// Your GitHub username, sent as the User-Agent
    username: String,

    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, value_enum, default_value_t = Verbosity::Warn)]
    verbosity: Verbosity,

    /// File listing the only repositories to include, one name per line
    #[arg(long, value_name = "FILE")]
    allow: Option<PathBuf>,

    /// File listing repositories to exclude, one name per line
    #[arg(long, value_name = "FILE")]
    deny: Option<PathBuf>,

    /// Contribution source: weekly (stats, keyed by login) or history (commits, keyed by email)
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Write the names and logins seen per email to FILE (history strategy)
    #[arg(long, value_name = "FILE")]
    identities: Option<PathBuf>,

    /// Maximum outbound requests per second
    #[arg(long)]
    max_per_second: Option<NonZeroU32>,

    /// Requests per resource before giving up on data that is not ready
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Items requested per page (1-100)
    #[arg(long)]
    page_size: Option<u32>,

    /// Repositories retrieved concurrently
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,
}

impl Cli {
    /// Flags take precedence over the environment
    fn apply_to(&self, config: &mut CollectorConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(rate) = self.max_per_second {
            config.max_per_second = rate;
        }
        if let Some(attempts) = self.max_attempts {
            config.max_attempts = attempts;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(in_flight) = self.max_in_flight {
            config.max_in_flight = in_flight;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the ranking
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbosity.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CollectorConfig::from_env().context("Invalid configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let filter = RepositoryFilter::new(read_names(cli.allow.as_deref())?, read_names(cli.deny.as_deref())?);
    let token = read_token()?;

    tracing::info!(
        organization = %cli.organization,
        strategy = %config.strategy,
        api_url = %config.api_url,
        "Starting collection"
    );

    let github = GitHubClientImpl::new(&config.api_url, &cli.username, &token)
        .context("Failed to create GitHub client")?;
    let service = CollectorService::new(Arc::new(github), &config, Arc::new(TracingEvents));

    let summary = service
        .summarize(&cli.organization, &filter)
        .await
        .with_context(|| format!("Failed to summarize contributions to {}", cli.organization))?;

    output::write_ranking(&mut io::stdout().lock(), &summary).context("Failed to write ranking")?;

    if let Some(path) = &cli.identities {
        match &summary.identities {
            Some(identities) => output::write_identities(path, identities)?,
            None => tracing::warn!(
                strategy = %config.strategy,
                "Identity details are only collected by the history strategy"
            ),
        }
    }

    Ok(())
}

fn read_names(path: Option<&Path>) -> Result<BTreeSet<String>> {
    match path {
        None => Ok(BTreeSet::new()),
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(RepositoryFilter::parse_names(&text))
        }
    }
}

fn read_token() -> Result<String> {
    if let Some(token) = env::var("GITHUB_TOKEN").ok().as_deref().and_then(non_empty) {
        return Ok(token);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let token = Password::new()
            .with_prompt("GitHub token")
            .interact()
            .context("Failed to read token")?;
        return non_empty(&token).context("No GitHub token given");
    }
    read_token_line(stdin.lock())
}

/// First line of piped input, trimmed
fn read_token_line<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;

    match non_empty(&line) {
        Some(token) => Ok(token),
        None => bail!("No GitHub token given: set GITHUB_TOKEN or pass it on stdin"),
    }
}

fn non_empty(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
