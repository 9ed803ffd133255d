//! Signal record ingestion command handlers for the CLI.

use std::path::PathBuf;

use aisov_core::AppConfig;
use clap::Subcommand;

use crate::input::read_jsonl;

/// Sub-commands available under `signals`.
#[derive(Debug, Subcommand)]
pub enum SignalsCommands {
    /// Append classified records from a JSON-lines file
    Import {
        path: PathBuf,
        /// Validate the file without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run_signals(config: &AppConfig, command: SignalsCommands) -> anyhow::Result<()> {
    match command {
        SignalsCommands::Import { path, dry_run } => run_import(config, &path, dry_run).await,
    }
}

/// Import every record in `path`.
///
/// The whole file is validated before the first insert. Records whose
/// `response_id` already exists are skipped, never overwritten.
///
/// # Errors
///
/// Returns an error if the file is invalid or an insert fails.
async fn run_import(config: &AppConfig, path: &std::path::Path, dry_run: bool) -> anyhow::Result<()> {
    let records = read_jsonl(path)?;

    if dry_run {
        println!(
            "dry-run: {} valid signal records in {}",
            records.len(),
            path.display()
        );
        return Ok(());
    }

    let pool = aisov_db::connect_from_config(config).await?;

    let mut inserted = 0_usize;
    let mut duplicates = 0_usize;
    for record in &records {
        if aisov_db::insert_signal_record(&pool, record).await? {
            inserted += 1;
        } else {
            tracing::debug!(response_id = %record.response_id, "signal record already stored");
            duplicates += 1;
        }
    }

    tracing::info!(inserted, duplicates, path = %path.display(), "signal import complete");
    println!("imported {inserted} signal records ({duplicates} already present)");
    Ok(())
}
