use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::{RecentTweet, TickerMetricsRow, TimelinePoint};

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("data file missing: {0}")]
    Missing(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),
}

/// Read access to the aggregated tweet data behind the dashboard.
///
/// Every `get_data_*` call returns at most `top` rows ordered by descending
/// `NUM_MENTIONS`; callers rely on that order.
pub trait ChartDataSource: Send + Sync {
    fn get_all_data(&self, top: usize) -> Result<Vec<TickerMetricsRow>, DataSourceError>;

    /// `month` is a two-digit month number ("01".."12"), any year.
    fn get_data_for_month(
        &self,
        month: &str,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError>;

    fn get_data_for_day(
        &self,
        day: NaiveDate,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError>;

    /// `hour` is truncated to the hour; minutes and seconds are ignored.
    fn get_data_for_hour(
        &self,
        hour: NaiveDateTime,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError>;

    /// Newest first, optionally restricted to one ticker.
    fn get_recent_tweets(
        &self,
        limit: usize,
        ticker: Option<&str>,
    ) -> Result<Vec<RecentTweet>, DataSourceError>;

    /// Per-day mention counts for one ticker, oldest first.
    fn get_ticker_timeline(&self, ticker: &str) -> Result<Vec<TimelinePoint>, DataSourceError>;
}
