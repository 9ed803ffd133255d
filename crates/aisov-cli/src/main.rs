mod input;
mod score;
mod signals;
mod views;

use std::path::PathBuf;

use aisov_core::{Granularity, IntentCategory, LlmName};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::signals::SignalsCommands;

#[derive(Debug, Parser)]
#[command(name = "aisov")]
#[command(about = "AI Share of Voice scoring and reporting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Signal record ingestion
    Signals {
        #[command(subcommand)]
        command: SignalsCommands,
    },
    /// Aggregate and score a period, persisting results to `visibility_scores`
    Score {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Read records from a JSON-lines file instead of the database
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print the summary without writing scores
        #[arg(long)]
        dry_run: bool,
    },
    /// Rank brands by AISOV for one period
    Leaderboard {
        #[arg(long, required_unless_present = "latest")]
        start: Option<NaiveDate>,
        #[arg(long, required_unless_present = "latest")]
        end: Option<NaiveDate>,
        /// Restrict to one LLM (chatgpt, claude, perplexity, gemini)
        #[arg(long)]
        llm: Option<LlmName>,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Show the most recently persisted overall score per brand
        #[arg(long, conflicts_with_all = ["start", "end", "llm", "input", "json"])]
        latest: bool,
    },
    /// Persisted overall scores for one brand, newest period first
    History {
        /// Defaults to the primary brand from the brands file
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(i64).range(1..))]
        limit: i64,
    },
    /// AISOV for one brand across consecutive periods
    Trend {
        /// Defaults to the primary brand from the brands file
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "week")]
        granularity: Granularity,
        #[arg(long)]
        llm: Option<LlmName>,
        #[arg(long)]
        intent: Option<IntentCategory>,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown visibility report for one brand
    Report {
        /// Defaults to the primary brand from the brands file
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = aisov_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("aisov: no command given; run `aisov --help` for usage");
        return Ok(());
    };

    match command {
        Commands::Db { command } => run_db(&config, &command).await,
        Commands::Signals { command } => signals::run_signals(&config, command).await,
        Commands::Score {
            start,
            end,
            input,
            dry_run,
        } => score::run_score(&config, start, end, input.as_deref(), dry_run).await,
        Commands::Leaderboard { latest: true, .. } => views::run_latest(&config).await,
        Commands::Leaderboard {
            start: Some(start),
            end: Some(end),
            llm,
            input,
            json,
            latest: false,
        } => views::run_leaderboard(&config, start, end, llm, input.as_deref(), json).await,
        Commands::Leaderboard { .. } => {
            anyhow::bail!("leaderboard needs --start and --end unless --latest is given")
        }
        Commands::History { brand, limit } => views::run_history(&config, brand, limit).await,
        Commands::Trend {
            brand,
            start,
            end,
            granularity,
            llm,
            intent,
            input,
            json,
        } => {
            let args = views::TrendArgs {
                brand,
                start,
                end,
                granularity,
                llm,
                intent,
                json,
            };
            views::run_trend(&config, args, input.as_deref()).await
        }
        Commands::Report {
            brand,
            start,
            end,
            input,
        } => views::run_report(&config, brand, start, end, input.as_deref()).await,
    }
}

async fn run_db(config: &aisov_core::AppConfig, command: &DbCommands) -> anyhow::Result<()> {
    let pool = aisov_db::connect_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            aisov_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = aisov_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
