//! Read-only views: leaderboard, trend, stored score history, and the
//! markdown brand report.
//!
//! Renderers return strings so a failed cell (`error`) or empty cell
//! (`no data`) never aborts the rest of the view.

use std::fmt::Write;
use std::path::Path;

use aisov_core::{
    AppConfig, BrandsFile, Granularity, IntentCategory, LlmName, Period, SignalRecord,
};
use aisov_scoring::{
    aggregate_group, competitor_displacement, displacement_rate, risk_index,
    sentiment_distribution, BatchOutcome, Dimension, GroupKey, Leaderboard, Scorer, Trend,
    TrendFilter,
};
use aisov_db::VisibilityScoreRow;
use chrono::{NaiveDate, Utc};

use crate::input::load_records;

const NO_DATA: &str = "no data";
const ERROR: &str = "error";

fn fmt_score(score: f64) -> String {
    format!("{score:.4}")
}

fn fmt_pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Resolve the focal brand: the explicit flag, else the brands file's primary.
fn resolve_brand(config: &AppConfig, brand: Option<String>) -> anyhow::Result<String> {
    if let Some(brand) = brand {
        return Ok(brand);
    }
    let brands = aisov_core::load_brands(&config.brands_path)?;
    Ok(brands.primary_brand)
}

/// The brands file when one is present at the configured path.
fn optional_brands(config: &AppConfig) -> anyhow::Result<Option<BrandsFile>> {
    if !config.brands_path.exists() {
        return Ok(None);
    }
    Ok(Some(aisov_core::load_brands(&config.brands_path)?))
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

pub(crate) async fn run_leaderboard(
    config: &AppConfig,
    start: NaiveDate,
    end: NaiveDate,
    llm: Option<LlmName>,
    input: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let period = Period::new(start, end)?;
    let records = load_records(config, input, period).await?;
    let outcome = aisov_scoring::run_scoring(&records, period, config.weights)?;
    let board = aisov_scoring::leaderboard(&outcome, &Dimension::from(llm), period);

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }
    if board.entries.is_empty() && board.errors.is_empty() {
        println!("no signal records for {period}");
        return Ok(());
    }
    print!("{}", render_leaderboard(&board)?);
    Ok(())
}

pub(crate) fn render_leaderboard(board: &Leaderboard) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{:<6}{:<30}{:<10}SAMPLE", "RANK", "BRAND", "AISOV")?;
    for (idx, entry) in board.entries.iter().enumerate() {
        writeln!(
            out,
            "{:<6}{:<30}{:<10}{}",
            idx + 1,
            entry.brand,
            fmt_score(entry.aisov_score),
            entry.sample_size
        )?;
    }
    for failure in &board.errors {
        writeln!(out, "{:<6}{:<30}{:<10}-", "-", failure.key.brand.to_string(), ERROR)?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Stored scores
// ---------------------------------------------------------------------------

pub(crate) async fn run_latest(config: &AppConfig) -> anyhow::Result<()> {
    let pool = aisov_db::connect_from_config(config).await?;
    let rows = aisov_db::list_latest_overall_scores(&pool).await?;
    if rows.is_empty() {
        println!("no persisted scores; run `aisov score` first");
        return Ok(());
    }
    print!("{}", render_score_rows(&rows)?);
    Ok(())
}

pub(crate) async fn run_history(
    config: &AppConfig,
    brand: Option<String>,
    limit: i64,
) -> anyhow::Result<()> {
    let brand = resolve_brand(config, brand)?;
    let pool = aisov_db::connect_from_config(config).await?;
    let rows = aisov_db::list_score_history(&pool, &brand, limit).await?;
    if rows.is_empty() {
        println!("no persisted scores for {brand}");
        return Ok(());
    }
    print!("{}", render_score_rows(&rows)?);
    Ok(())
}

/// One line per persisted overall score, in the order given.
pub(crate) fn render_score_rows(rows: &[VisibilityScoreRow]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{:<24}{:<30}{:<10}{:<8}COMPUTED",
        "PERIOD", "BRAND", "AISOV", "SAMPLE"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<24}{:<30}{:<10}{:<8}{}",
            format!("{}..{}", row.period_start, row.period_end),
            row.brand_name,
            format!("{:.4}", row.aisov_score),
            row.sample_size,
            row.computed_at.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct TrendArgs {
    pub brand: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub llm: Option<LlmName>,
    pub intent: Option<IntentCategory>,
    pub json: bool,
}

pub(crate) async fn run_trend(
    config: &AppConfig,
    args: TrendArgs,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let period = Period::new(args.start, args.end)?;
    let filter = TrendFilter {
        brand: resolve_brand(config, args.brand)?,
        llm: args.llm.into(),
        intent: args.intent.into(),
    };
    let records = load_records(config, input, period).await?;
    let scorer = Scorer::new(config.weights)?;
    let series = aisov_scoring::trend(
        &records,
        &scorer,
        &filter,
        &period.buckets(args.granularity),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }
    print!("{}", render_trend(&filter, &series)?);
    Ok(())
}

pub(crate) fn render_trend(filter: &TrendFilter, series: &Trend) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "trend for {} (llm={}, intent={})",
        filter.brand, filter.llm, filter.intent
    )?;
    writeln!(out, "{:<26}{:<10}SAMPLE", "PERIOD", "AISOV")?;
    for point in &series.points {
        let cell = match point.aisov_score {
            Some(score) => fmt_score(score),
            None if series.errors.iter().any(|e| e.key.period == point.period) => {
                ERROR.to_string()
            }
            None => NO_DATA.to_string(),
        };
        writeln!(out, "{:<26}{:<10}{}", point.period.to_string(), cell, point.sample_size)?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

pub(crate) async fn run_report(
    config: &AppConfig,
    brand: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let period = Period::new(start, end)?;
    let brands = optional_brands(config)?;
    let brand = match (brand, &brands) {
        (Some(brand), _) => brand,
        (None, Some(file)) => file.primary_brand.clone(),
        (None, None) => resolve_brand(config, None)?,
    };
    let records = load_records(config, input, period).await?;

    if records.is_empty() {
        println!("no signal data to report for {period}; run `signals import` first");
        return Ok(());
    }

    let outcome = aisov_scoring::run_scoring(&records, period, config.weights)?;
    let view = ReportView {
        brand: &brand,
        period,
        brands: brands.as_ref(),
    };
    print!("{}", render_report(&view, &records, &outcome)?);
    Ok(())
}

/// Which brand and period a report covers.
///
/// `brands` marks competitors the classifier was configured to look for; it
/// is `None` when no brands file is available.
pub(crate) struct ReportView<'a> {
    pub brand: &'a str,
    pub period: Period,
    pub brands: Option<&'a BrandsFile>,
}

/// Score and sample cells for one group key.
fn group_cells(outcome: &BatchOutcome, key: &GroupKey) -> (String, String) {
    match (outcome.find(key), outcome.error_for(key)) {
        (Some(scored), _) => (
            fmt_score(scored.aisov_score),
            scored.group.sample_size.to_string(),
        ),
        (None, Some(_)) => (ERROR.to_string(), "-".to_string()),
        (None, None) => (NO_DATA.to_string(), "0".to_string()),
    }
}

/// Markdown report for one brand over one period.
#[allow(clippy::too_many_lines)]
pub(crate) fn render_report(
    view: &ReportView<'_>,
    records: &[SignalRecord],
    outcome: &BatchOutcome,
) -> Result<String, std::fmt::Error> {
    let (brand, period) = (view.brand, view.period);
    let mut out = String::new();
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let brand_records: Vec<&SignalRecord> =
        records.iter().filter(|r| r.brand_name == brand).collect();

    writeln!(out, "# AI Share of Voice Report: {brand}")?;
    writeln!(out)?;
    writeln!(out, "**Generated**: {now}")?;
    writeln!(out, "**Period**: {period}")?;
    writeln!(out, "**Responses**: {}", brand_records.len())?;
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out)?;

    writeln!(out, "## Leaderboard")?;
    writeln!(out)?;
    writeln!(out, "| Rank | Brand | AISOV | Sample |")?;
    writeln!(out, "|------|-------|-------|--------|")?;
    let board = aisov_scoring::leaderboard(outcome, &Dimension::All, period);
    for (idx, entry) in board.entries.iter().enumerate() {
        let label = if entry.brand == brand {
            format!("**{}**", entry.brand)
        } else {
            entry.brand.clone()
        };
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            idx + 1,
            label,
            fmt_score(entry.aisov_score),
            entry.sample_size
        )?;
    }
    for failure in &board.errors {
        writeln!(out, "| - | {} | {ERROR} | - |", failure.key.brand)?;
    }
    writeln!(out)?;

    writeln!(out, "## AISOV by LLM")?;
    writeln!(out)?;
    writeln!(out, "| LLM | AISOV | Sample |")?;
    writeln!(out, "|-----|-------|--------|")?;
    for llm in LlmName::ALL {
        let key = GroupKey {
            llm: Dimension::Exact(llm),
            ..GroupKey::overall(brand, period)
        };
        let (cell, sample) = group_cells(outcome, &key);
        writeln!(out, "| {llm} | {cell} | {sample} |")?;
    }
    writeln!(out)?;

    writeln!(out, "## AISOV by Intent")?;
    writeln!(out)?;
    writeln!(out, "| Intent | AISOV | Sample |")?;
    writeln!(out, "|--------|-------|--------|")?;
    for intent in IntentCategory::ALL {
        let key = GroupKey {
            intent: Dimension::Exact(intent),
            ..GroupKey::overall(brand, period)
        };
        let (cell, sample) = group_cells(outcome, &key);
        writeln!(out, "| {intent} | {cell} | {sample} |")?;
    }
    writeln!(out)?;

    let overall = aggregate_group(
        GroupKey::overall(brand, period),
        brand_records.iter().copied(),
    );

    writeln!(out, "## Sentiment")?;
    writeln!(out)?;
    if overall.counts.mentioned == 0 {
        writeln!(out, "{NO_DATA}: {brand} was not mentioned in this period")?;
    } else {
        let dist = sentiment_distribution(&overall);
        writeln!(out, "| Positive | Neutral | Negative | Mentions |")?;
        writeln!(out, "|----------|---------|----------|----------|")?;
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            fmt_pct(dist.positive),
            fmt_pct(dist.neutral),
            fmt_pct(dist.negative),
            dist.mentioned
        )?;
    }
    writeln!(out)?;

    writeln!(out, "### Sentiment by LLM")?;
    writeln!(out)?;
    writeln!(out, "| LLM | Positive | Neutral | Negative | Mentions |")?;
    writeln!(out, "|-----|----------|---------|----------|----------|")?;
    for llm in LlmName::ALL {
        let key = GroupKey {
            llm: Dimension::Exact(llm),
            ..GroupKey::overall(brand, period)
        };
        let group = aggregate_group(
            key,
            brand_records.iter().copied().filter(|r| r.llm_name == llm),
        );
        if group.counts.mentioned == 0 {
            writeln!(out, "| {llm} | {NO_DATA} | - | - | 0 |")?;
            continue;
        }
        let dist = sentiment_distribution(&group);
        writeln!(
            out,
            "| {llm} | {} | {} | {} | {} |",
            fmt_pct(dist.positive),
            fmt_pct(dist.neutral),
            fmt_pct(dist.negative),
            dist.mentioned
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Risk and Displacement")?;
    writeln!(out)?;
    if overall.sample_size == 0 {
        writeln!(out, "- **Displacement rate**: {NO_DATA}")?;
    } else {
        writeln!(
            out,
            "- **Displacement rate**: {} of {} responses",
            fmt_pct(displacement_rate(&overall)),
            overall.sample_size
        )?;
    }
    if overall.counts.mentioned == 0 {
        writeln!(out, "- **Risk index**: {NO_DATA}")?;
    } else {
        writeln!(out, "- **Risk index**: {:.3}", risk_index(&overall))?;
    }
    writeln!(out)?;

    writeln!(out, "## Competitor Displacement")?;
    writeln!(out)?;
    let competitors = competitor_displacement(brand_records.iter().copied());
    if competitors.is_empty() {
        writeln!(out, "{NO_DATA}: no competitors named")?;
    } else {
        writeln!(out, "| Competitor | Tracked | Displaced | Appearances | Rate |")?;
        writeln!(out, "|------------|---------|-----------|-------------|------|")?;
        for c in &competitors {
            let tracked = match view.brands {
                Some(file) if file.is_competitor(&c.competitor) => "yes",
                Some(_) => "no",
                None => "-",
            };
            writeln!(
                out,
                "| {} | {tracked} | {} | {} | {} |",
                c.competitor,
                c.displacement_count,
                c.appearances,
                fmt_pct(c.displacement_rate)
            )?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use aisov_core::{ContextType, ScoringWeights, Sentiment};
    use aisov_scoring::{GroupError, ScoringError, TrendPoint};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> Period {
        Period::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap()
    }

    fn record(brand: &str, llm: LlmName, mentioned: bool, sentiment: Sentiment) -> SignalRecord {
        SignalRecord {
            response_id: uuid::Uuid::new_v4(),
            brand_name: brand.to_string(),
            llm_name: llm,
            intent_category: IntentCategory::Comparison,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            brand_mentioned: mentioned,
            rank_position: if mentioned { Some(1) } else { None },
            sentiment,
            context_type: if sentiment == Sentiment::Negative {
                ContextType::Criticism
            } else {
                ContextType::Comparison
            },
            recommendation_strength: if mentioned { 0.6 } else { 0.0 },
            competitor_mentioned: !mentioned,
            competitors: if mentioned {
                vec![]
            } else {
                vec!["Salesforce".to_string()]
            },
        }
    }

    #[test]
    fn leaderboard_renders_error_rows_after_ranked_entries() {
        let key = GroupKey::overall("Zoho", march());
        let board = Leaderboard {
            entries: vec![aisov_scoring::LeaderboardEntry {
                brand: "HubSpot".to_string(),
                aisov_score: 0.608_333,
                sample_size: 10,
            }],
            errors: vec![GroupError {
                key: key.clone(),
                error: ScoringError::InsufficientData { key },
            }],
        };

        let text = render_leaderboard(&board).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("HubSpot") && lines[1].contains("0.6083"));
        assert!(lines[2].contains("Zoho") && lines[2].contains("error"));
    }

    #[test]
    fn leaderboard_json_carries_failed_groups() {
        let key = GroupKey::overall("Zoho", march());
        let board = Leaderboard {
            entries: vec![],
            errors: vec![GroupError {
                key: key.clone(),
                error: ScoringError::InsufficientData { key },
            }],
        };

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["entries"].as_array().unwrap().len(), 0);
        assert_eq!(json["errors"][0]["key"]["brand"], "Zoho");
        assert!(json["errors"][0]["error"].is_string(), "{json}");
    }

    #[test]
    fn stored_scores_render_newest_first_as_given() {
        let computed_at = Utc.with_ymd_and_hms(2026, 4, 1, 6, 30, 0).unwrap();
        let row = |id, start, end, score| VisibilityScoreRow {
            id,
            brand_name: "HubSpot".to_string(),
            llm_name: None,
            intent_category: None,
            period_start: start,
            period_end: end,
            mention_rate: Decimal::ONE,
            avg_rank_score: Decimal::ONE,
            positive_sentiment_ratio: Decimal::ONE,
            recommendation_strength_avg: Decimal::ONE,
            aisov_score: score,
            sample_size: 40,
            computed_at,
        };
        let rows = vec![
            row(2, date(2026, 3, 1), date(2026, 3, 31), Decimal::new(9600, 4)),
            row(1, date(2026, 2, 1), date(2026, 2, 28), Decimal::new(5125, 4)),
        ];

        let text = render_score_rows(&rows).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026-03-01..2026-03-31"), "{text}");
        assert!(lines[1].contains("0.9600") && lines[1].contains("2026-04-01 06:30"));
        assert!(lines[2].starts_with("2026-02-01..2026-02-28"), "{text}");
        assert!(lines[2].contains("0.5125"), "{text}");
    }

    #[test]
    fn trend_marks_empty_periods_as_no_data() {
        let filter = TrendFilter {
            brand: "HubSpot".to_string(),
            llm: Dimension::All,
            intent: Dimension::All,
        };
        let series = Trend {
            points: vec![
                TrendPoint {
                    period: Period::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap(),
                    aisov_score: Some(0.52),
                    sample_size: 25,
                },
                TrendPoint {
                    period: Period::new(date(2026, 2, 1), date(2026, 2, 28)).unwrap(),
                    aisov_score: None,
                    sample_size: 0,
                },
            ],
            errors: vec![],
        };

        let text = render_trend(&filter, &series).unwrap();
        assert!(text.contains("0.5200"), "{text}");
        assert!(text.contains("no data"), "{text}");
        assert!(!text.contains("error"), "{text}");
    }

    #[test]
    fn report_covers_every_section_for_the_focal_brand() {
        let records = vec![
            record("HubSpot", LlmName::ChatGpt, true, Sentiment::Positive),
            record("HubSpot", LlmName::ChatGpt, true, Sentiment::Negative),
            record("HubSpot", LlmName::Claude, false, Sentiment::Neutral),
            record("Zoho", LlmName::Claude, true, Sentiment::Neutral),
        ];
        let outcome =
            aisov_scoring::run_scoring(&records, march(), ScoringWeights::default()).unwrap();

        let view = ReportView {
            brand: "HubSpot",
            period: march(),
            brands: None,
        };
        let report = render_report(&view, &records, &outcome).unwrap();

        assert!(report.starts_with("# AI Share of Voice Report: HubSpot"));
        assert!(report.contains("**HubSpot**"), "focal brand is highlighted");
        assert!(report.contains("| gemini | no data | 0 |"), "{report}");
        assert!(report.contains("| 50.0% | 0.0% | 50.0% | 2 |"), "{report}");
        assert!(report.contains("33.3% of 3 responses"), "{report}");
        // negative 1/2 and criticism 1/2
        assert!(report.contains("**Risk index**: 0.500"), "{report}");
        assert!(report.contains("| Salesforce | - | 1 | 1 | 100.0% |"), "{report}");
    }

    #[test]
    fn report_breaks_scores_down_by_intent() {
        let records = vec![
            record("HubSpot", LlmName::ChatGpt, true, Sentiment::Positive),
            record("HubSpot", LlmName::Claude, false, Sentiment::Neutral),
        ];
        let outcome =
            aisov_scoring::run_scoring(&records, march(), ScoringWeights::default()).unwrap();
        let view = ReportView {
            brand: "HubSpot",
            period: march(),
            brands: None,
        };

        let report = render_report(&view, &records, &outcome).unwrap();

        let overall = outcome
            .find(&GroupKey::overall("HubSpot", march()))
            .unwrap();
        // every record is a comparison prompt, so that row matches the overall score
        let comparison = format!("| comparison | {} | 2 |", fmt_score(overall.aisov_score));
        assert!(report.contains("## AISOV by Intent"), "{report}");
        assert!(report.contains(&comparison), "{report}");
        assert!(report.contains("| buying_intent | no data | 0 |"), "{report}");
        assert!(report.contains("| risk_criticism | no data | 0 |"), "{report}");
    }

    #[test]
    fn report_splits_sentiment_by_llm() {
        let records = vec![
            record("HubSpot", LlmName::ChatGpt, true, Sentiment::Positive),
            record("HubSpot", LlmName::ChatGpt, true, Sentiment::Negative),
            record("HubSpot", LlmName::Perplexity, true, Sentiment::Neutral),
            record("HubSpot", LlmName::Claude, false, Sentiment::Neutral),
        ];
        let outcome =
            aisov_scoring::run_scoring(&records, march(), ScoringWeights::default()).unwrap();
        let view = ReportView {
            brand: "HubSpot",
            period: march(),
            brands: None,
        };

        let report = render_report(&view, &records, &outcome).unwrap();

        assert!(report.contains("### Sentiment by LLM"), "{report}");
        assert!(report.contains("| chatgpt | 50.0% | 0.0% | 50.0% | 2 |"), "{report}");
        assert!(report.contains("| perplexity | 0.0% | 100.0% | 0.0% | 1 |"), "{report}");
        // claude saw the prompt but never named the brand
        assert!(report.contains("| claude | no data | - | - | 0 |"), "{report}");
    }

    #[test]
    fn report_flags_competitors_missing_from_brands_file() {
        let mut untracked = record("HubSpot", LlmName::Gemini, false, Sentiment::Neutral);
        untracked.competitors = vec!["Freshsales".to_string()];
        let records = vec![
            record("HubSpot", LlmName::Claude, false, Sentiment::Neutral),
            untracked,
        ];
        let outcome =
            aisov_scoring::run_scoring(&records, march(), ScoringWeights::default()).unwrap();
        let brands = BrandsFile {
            primary_brand: "HubSpot".to_string(),
            competitors: vec!["Salesforce".to_string(), "Zoho".to_string()],
        };
        let view = ReportView {
            brand: "HubSpot",
            period: march(),
            brands: Some(&brands),
        };

        let report = render_report(&view, &records, &outcome).unwrap();

        assert!(report.contains("| Salesforce | yes | 1 | 1 | 100.0% |"), "{report}");
        assert!(report.contains("| Freshsales | no | 1 | 1 | 100.0% |"), "{report}");
    }

    #[test]
    fn report_for_unmentioned_brand_shows_no_data() {
        let records = vec![record("Zoho", LlmName::Gemini, true, Sentiment::Positive)];
        let outcome =
            aisov_scoring::run_scoring(&records, march(), ScoringWeights::default()).unwrap();

        let view = ReportView {
            brand: "Pipedrive",
            period: march(),
            brands: None,
        };
        let report = render_report(&view, &records, &outcome).unwrap();
        assert!(report.contains("- **Displacement rate**: no data"));
        assert!(report.contains("- **Risk index**: no data"));
        assert!(report.contains("no data: no competitors named"));
    }
}
