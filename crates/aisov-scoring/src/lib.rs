//! AI Share of Voice scoring for AISOV.
//!
//! Aggregates classified LLM responses by brand, LLM, intent, and period,
//! scores each group with a weighted composite, and derives leaderboard,
//! trend, sentiment, displacement, and risk views from the results.

pub mod aggregator;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod scorer;
pub mod types;

pub use aggregator::{aggregate, aggregate_group, standard_dimensions, GroupingSpec};
pub use error::ScoringError;
pub use pipeline::run_scoring;
pub use query::{
    competitor_displacement, displacement_rate, leaderboard, risk_index, sentiment_distribution,
    trend, CompetitorDisplacement, Leaderboard, LeaderboardEntry, SentimentDistribution, Trend,
    TrendFilter, TrendPoint,
};
pub use scorer::{score_batch, Scorer};
pub use types::{
    AggregateGroup, BatchOutcome, Dimension, GroupCounts, GroupError, GroupKey, ScoredGroup,
};
