use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tweet sentiment classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            "NEUTRAL" => Ok(Sentiment::Neutral),
            _ => Err(format!("Unknown sentiment '{}'", s)),
        }
    }
}

/// Mention counts for one ticker over a period.
/// NUM_POSITIVE + NUM_NEGATIVE + NUM_NEUTRAL == NUM_MENTIONS
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TickerMetricsRow {
    pub ticker: String,
    pub num_mentions: u64,
    pub num_positive: u64,
    pub num_negative: u64,
    pub num_neutral: u64,
}

impl TickerMetricsRow {
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            num_mentions: 0,
            num_positive: 0,
            num_negative: 0,
            num_neutral: 0,
        }
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        self.num_mentions += 1;
        match sentiment {
            Sentiment::Positive => self.num_positive += 1,
            Sentiment::Negative => self.num_negative += 1,
            Sentiment::Neutral => self.num_neutral += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RecentTweet {
    pub ticker: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: NaiveDateTime,
}

/// Daily mention counts for a single ticker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub mentions: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}
