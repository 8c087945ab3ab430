use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AggregationMode, HourOfDay, MonthOffset, QueryDescriptor, RecentTweet, TickerMetricsRow, TimelinePoint, TopN};

/// One bar of the "Top ticker leaderboard" chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardBar {
    pub ticker: String,
    pub mentions: u64,
}

/// Per-ticker share of positive, negative and neutral tweets (0.0 - 1.0)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentShare {
    pub ticker: String,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricCard {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TweetTableRow {
    pub text: String,
    pub fill_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordWeight {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub descriptor: QueryDescriptor,
    pub rows: Vec<TickerMetricsRow>,
    pub leaderboard: Vec<LeaderboardBar>,
    pub sentiment_breakdown: Vec<SentimentShare>,
    pub metrics: Vec<MetricCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTweetsResponse {
    pub tweets: Vec<RecentTweet>,
    pub table: Vec<TweetTableRow>,
    pub word_cloud: Vec<WordWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerTimeline {
    pub ticker: String,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerTrendsResponse {
    pub primary: TickerTimeline,
    pub secondary: Option<TickerTimeline>,
}

/// Values for every selector on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOptions {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub default_date: NaiveDate,
    pub top_options: Vec<usize>,
    pub aggregation_modes: Vec<AggregationMode>,
    pub supported_modes: Vec<AggregationMode>,
    pub month_options: Vec<String>,
    pub hour_options: Vec<String>,
    pub recent_tweet_limits: Vec<usize>,
    pub default_top: usize,
}

impl DashboardOptions {
    pub fn new(
        min_date: NaiveDate,
        max_date: NaiveDate,
        supported_modes: Vec<AggregationMode>,
        recent_tweet_limits: &[usize],
    ) -> Self {
        Self {
            min_date,
            max_date,
            default_date: max_date,
            top_options: TopN::OPTIONS.to_vec(),
            aggregation_modes: AggregationMode::ALL_MODES.to_vec(),
            supported_modes,
            month_options: MonthOffset::LABELS.iter().map(|s| s.to_string()).collect(),
            hour_options: HourOfDay::options(),
            recent_tweet_limits: recent_tweet_limits.to_vec(),
            default_top: TopN::default().get(),
        }
    }
}
