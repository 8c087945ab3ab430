use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::external::chart_data::{ChartDataSource, DataSourceError};
use crate::models::{RecentTweet, Sentiment, TickerMetricsRow, TimelinePoint};

pub const TWEETS_FILE: &str = "tweets.csv";
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct CsvTweetRow {
    #[serde(rename = "TICKER")]
    ticker: String,
    #[serde(rename = "CREATED_AT")]
    created_at: String,
    #[serde(rename = "SENTIMENT")]
    sentiment: String,
    #[serde(rename = "TEXT")]
    text: String,
}

impl CsvTweetRow {
    fn into_tweet(self) -> Result<RecentTweet> {
        let created_at = NaiveDateTime::parse_from_str(self.created_at.trim(), CREATED_AT_FORMAT)
            .with_context(|| format!("Failed to parse CREATED_AT: {}", self.created_at))?;
        let sentiment = self
            .sentiment
            .parse::<Sentiment>()
            .map_err(anyhow::Error::msg)?;

        Ok(RecentTweet {
            ticker: self.ticker.trim().to_uppercase(),
            text: self.text,
            sentiment,
            created_at,
        })
    }
}

/// Classified tweets stored as `<base>/data/tweets.csv`.
///
/// The file is re-read on every call so that a page refresh picks up whatever
/// the upstream pipeline has written since.
pub struct CsvChartData {
    data_dir: PathBuf,
}

impl CsvChartData {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            data_dir: base_path.as_ref().join("data"),
        }
    }

    fn tweets_path(&self) -> PathBuf {
        self.data_dir.join(TWEETS_FILE)
    }

    fn load_tweets(&self) -> Result<Vec<RecentTweet>, DataSourceError> {
        let path = self.tweets_path();
        if !path.is_file() {
            error!("Tweet data file not found at {:?}", path);
            return Err(DataSourceError::Missing(path.display().to_string()));
        }

        let tweets = read_tweets_file(&path).map_err(|e| {
            error!("Failed to load tweets from {:?}: {:#}", path, e);
            DataSourceError::Parse(format!("{:#}", e))
        })?;

        debug!("Loaded {} tweets from {:?}", tweets.len(), path);
        Ok(tweets)
    }

    fn top_tickers<F>(&self, top: usize, keep: F) -> Result<Vec<TickerMetricsRow>, DataSourceError>
    where
        F: Fn(&NaiveDateTime) -> bool,
    {
        let tweets = self.load_tweets()?;

        let mut by_ticker: HashMap<String, TickerMetricsRow> = HashMap::new();
        for tweet in tweets.iter().filter(|t| keep(&t.created_at)) {
            by_ticker
                .entry(tweet.ticker.clone())
                .or_insert_with(|| TickerMetricsRow::empty(tweet.ticker.clone()))
                .record(tweet.sentiment);
        }

        Ok(rank_rows(by_ticker.into_values().collect(), top))
    }
}

fn read_tweets_file(path: &Path) -> Result<Vec<RecentTweet>> {
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file_content.as_bytes());

    let mut tweets = Vec::new();
    for (line_num, result) in reader.deserialize::<CsvTweetRow>().enumerate() {
        let row = result.with_context(|| format!("Line {}: Failed to parse CSV row", line_num + 2))?;
        let tweet = row
            .into_tweet()
            .with_context(|| format!("Line {}", line_num + 2))?;
        tweets.push(tweet);
    }

    Ok(tweets)
}

/// Descending by mentions, ties broken alphabetically, cut to `top`.
pub fn rank_rows(mut rows: Vec<TickerMetricsRow>, top: usize) -> Vec<TickerMetricsRow> {
    rows.sort_by(|a, b| {
        b.num_mentions
            .cmp(&a.num_mentions)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    rows.truncate(top);
    rows
}

fn parse_month(month: &str) -> Result<u32, DataSourceError> {
    match month.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(DataSourceError::InvalidPeriod(format!(
            "month must be 01..12, got '{}'",
            month
        ))),
    }
}

impl ChartDataSource for CsvChartData {
    fn get_all_data(&self, top: usize) -> Result<Vec<TickerMetricsRow>, DataSourceError> {
        self.top_tickers(top, |_| true)
    }

    fn get_data_for_month(
        &self,
        month: &str,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError> {
        let month = parse_month(month)?;
        self.top_tickers(top, |created_at| created_at.month() == month)
    }

    fn get_data_for_day(
        &self,
        day: NaiveDate,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError> {
        self.top_tickers(top, |created_at| created_at.date() == day)
    }

    fn get_data_for_hour(
        &self,
        hour: NaiveDateTime,
        top: usize,
    ) -> Result<Vec<TickerMetricsRow>, DataSourceError> {
        self.top_tickers(top, |created_at| {
            created_at.date() == hour.date() && created_at.hour() == hour.hour()
        })
    }

    fn get_recent_tweets(
        &self,
        limit: usize,
        ticker: Option<&str>,
    ) -> Result<Vec<RecentTweet>, DataSourceError> {
        let mut tweets: Vec<RecentTweet> = self
            .load_tweets()?
            .into_iter()
            .filter(|t| ticker.map_or(true, |wanted| t.ticker.eq_ignore_ascii_case(wanted)))
            .collect();

        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tweets.truncate(limit);
        Ok(tweets)
    }

    fn get_ticker_timeline(&self, ticker: &str) -> Result<Vec<TimelinePoint>, DataSourceError> {
        let mut by_day: BTreeMap<NaiveDate, TimelinePoint> = BTreeMap::new();

        for tweet in self
            .load_tweets()?
            .into_iter()
            .filter(|t| t.ticker.eq_ignore_ascii_case(ticker))
        {
            let date = tweet.created_at.date();
            let point = by_day.entry(date).or_insert_with(|| TimelinePoint {
                date,
                mentions: 0,
                positive: 0,
                negative: 0,
                neutral: 0,
            });
            point.mentions += 1;
            match tweet.sentiment {
                Sentiment::Positive => point.positive += 1,
                Sentiment::Negative => point.negative += 1,
                Sentiment::Neutral => point.neutral += 1,
            }
        }

        Ok(by_day.into_values().collect())
    }
}
