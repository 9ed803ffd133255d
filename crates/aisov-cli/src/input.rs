//! Signal record sources: a JSON-lines file or the database.

use std::path::Path;

use aisov_core::{AppConfig, Period, SignalRecord};
use anyhow::Context;

/// Parse JSON-lines text into validated records.
///
/// Blank lines are skipped. The first malformed line aborts the whole parse
/// so a partially valid file is never scored.
///
/// # Errors
///
/// Returns an error naming the 1-based line number of the first bad record.
pub(crate) fn parse_jsonl(content: &str) -> anyhow::Result<Vec<SignalRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            SignalRecord::from_json(line).with_context(|| format!("line {}", idx + 1))
        })
        .collect()
}

/// Read and parse a JSON-lines file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any record is invalid.
pub(crate) fn read_jsonl(path: &Path) -> anyhow::Result<Vec<SignalRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_jsonl(&content).with_context(|| format!("invalid signal record in {}", path.display()))
}

/// Load the records observed in `period`.
///
/// With `input` set, the file is read and filtered to the period; otherwise
/// the database is queried.
///
/// # Errors
///
/// Returns an error if the file is invalid, or the database is unreachable.
pub(crate) async fn load_records(
    config: &AppConfig,
    input: Option<&Path>,
    period: Period,
) -> anyhow::Result<Vec<SignalRecord>> {
    let records = match input {
        Some(path) => {
            let mut records = read_jsonl(path)?;
            records.retain(|r| period.contains(r.timestamp));
            records
        }
        None => {
            let pool = aisov_db::connect_from_config(config).await?;
            aisov_db::list_signal_records(&pool, period).await?
        }
    };

    tracing::info!(
        %period,
        records = records.len(),
        source = if input.is_some() { "file" } else { "database" },
        "loaded signal records"
    );
    Ok(records)
}
