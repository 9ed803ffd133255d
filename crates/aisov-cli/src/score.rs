//! `score` command: aggregate a period, score every group, persist results.

use std::path::Path;

use aisov_core::{AppConfig, Period};
use aisov_scoring::{BatchOutcome, Dimension};
use chrono::{NaiveDate, Utc};

use crate::input::load_records;
use crate::views::render_leaderboard;

/// Score the standard dimensions for `[start, end]`.
///
/// Scores are written to `visibility_scores` only when records came from the
/// database and `dry_run` is off. A file run is always a preview.
///
/// # Errors
///
/// Returns an error if the period is inverted, the weights are invalid, or
/// loading or persisting fails. Per-group scoring failures are reported, not
/// propagated.
pub(crate) async fn run_score(
    config: &AppConfig,
    start: NaiveDate,
    end: NaiveDate,
    input: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let period = Period::new(start, end)?;
    let records = load_records(config, input, period).await?;
    let outcome = aisov_scoring::run_scoring(&records, period, config.weights)?;

    print!("{}", render_summary(&outcome, period)?);

    if dry_run || input.is_some() {
        println!("dry-run: scores not persisted");
        return Ok(());
    }
    if outcome.scored.is_empty() {
        println!("nothing to persist");
        return Ok(());
    }

    let pool = aisov_db::connect_from_config(config).await?;
    let written = aisov_db::insert_visibility_scores(&pool, &outcome, Utc::now()).await?;
    tracing::info!(written, %period, "visibility scores persisted");
    println!("persisted {written} visibility scores");
    Ok(())
}

/// Counts, failures, and the overall leaderboard for one scoring run.
pub(crate) fn render_summary(
    outcome: &BatchOutcome,
    period: Period,
) -> Result<String, std::fmt::Error> {
    use std::fmt::Write;

    let mut out = String::new();
    writeln!(
        out,
        "period {period}: {} groups scored, {} failed",
        outcome.scored.len(),
        outcome.errors.len()
    )?;
    for failure in &outcome.errors {
        writeln!(out, "  error: {}: {}", failure.key, failure.error)?;
    }
    writeln!(out)?;

    let board = aisov_scoring::leaderboard(outcome, &Dimension::All, period);
    out.push_str(&render_leaderboard(&board)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use aisov_core::{
        ContextType, IntentCategory, LlmName, ScoringWeights, Sentiment, SignalRecord,
    };
    use chrono::TimeZone;

    use super::*;

    fn record(brand: &str, mentioned: bool) -> SignalRecord {
        SignalRecord {
            response_id: uuid::Uuid::new_v4(),
            brand_name: brand.to_string(),
            llm_name: LlmName::Claude,
            intent_category: IntentCategory::BuyingIntent,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            brand_mentioned: mentioned,
            rank_position: None,
            sentiment: Sentiment::Neutral,
            context_type: ContextType::Neutral,
            recommendation_strength: 0.5,
            competitor_mentioned: false,
            competitors: vec![],
        }
    }

    #[test]
    fn summary_lists_group_counts_and_leaderboard() {
        let period = Period::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap();
        let records = vec![record("HubSpot", true), record("Zoho", false)];
        let outcome =
            aisov_scoring::run_scoring(&records, period, ScoringWeights::default()).unwrap();

        let summary = render_summary(&outcome, period).unwrap();
        // overall + per-LLM + per-intent for two brands
        assert!(summary.contains("6 groups scored, 0 failed"), "{summary}");
        let hubspot = summary.find("HubSpot").unwrap();
        let zoho = summary.find("Zoho").unwrap();
        assert!(hubspot < zoho, "higher score should be listed first");
    }
}
