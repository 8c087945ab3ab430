use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity at which ticker mentions are bucketed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    All,
    Monthly,
    Daily,
    Hourly,
}

impl AggregationMode {
    pub const ALL_MODES: [AggregationMode; 4] = [
        AggregationMode::All,
        AggregationMode::Monthly,
        AggregationMode::Daily,
        AggregationMode::Hourly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AggregationMode::All => "All",
            AggregationMode::Monthly => "Monthly",
            AggregationMode::Daily => "Daily",
            AggregationMode::Hourly => "Hourly",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            AggregationMode::All => 0,
            AggregationMode::Monthly => 1,
            AggregationMode::Daily => 2,
            AggregationMode::Hourly => 3,
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(AggregationMode::All),
            "monthly" => Ok(AggregationMode::Monthly),
            "daily" => Ok(AggregationMode::Daily),
            "hourly" => Ok(AggregationMode::Hourly),
            _ => Err(format!(
                "Unknown aggregation type '{}'. Must be one of All, Monthly, Daily, Hourly",
                s
            )),
        }
    }
}

/// Number of tickers shown on the leaderboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "usize", try_from = "usize")]
pub struct TopN(usize);

impl TopN {
    pub const OPTIONS: [usize; 4] = [3, 5, 10, 15];

    pub fn new(value: usize) -> Result<Self, String> {
        if Self::OPTIONS.contains(&value) {
            Ok(TopN(value))
        } else {
            Err(format!("Top must be one of {:?}, got {}", Self::OPTIONS, value))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN(Self::OPTIONS[0])
    }
}

impl TryFrom<usize> for TopN {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        TopN::new(value)
    }
}

impl From<TopN> for usize {
    fn from(value: TopN) -> Self {
        value.0
    }
}

/// How many months back from the latest available day ("Current-0", "Current-1").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthOffset(u8);

impl MonthOffset {
    pub const LABELS: [&'static str; 2] = ["Current-0", "Current-1"];

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl FromStr for MonthOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("Current-").unwrap_or(trimmed);
        match digits {
            "0" => Ok(MonthOffset(0)),
            "1" => Ok(MonthOffset(1)),
            _ => Err(format!(
                "Month must be one of {:?}, got '{}'",
                Self::LABELS,
                s
            )),
        }
    }
}

/// Hour picker value, one of "0:00" .. "23:00".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourOfDay(u32);

impl HourOfDay {
    pub fn hour(&self) -> u32 {
        self.0
    }

    pub fn options() -> Vec<String> {
        (0..24).map(|h| HourOfDay(h).to_string()).collect()
    }
}

impl fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:00", self.0)
    }
}

impl FromStr for HourOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Time must be an hour between 0:00 and 23:00, got '{}'", s);

        let hour = s.strip_suffix(":00").ok_or_else(invalid)?;
        // canonical form only: no sign, no leading zero
        if hour.is_empty() || !hour.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if hour.len() > 1 && hour.starts_with('0') {
            return Err(invalid());
        }
        match hour.parse::<u32>() {
            Ok(h) if h < 24 => Ok(HourOfDay(h)),
            _ => Err(invalid()),
        }
    }
}

/// Secondary widget values; which ones matter depends on the aggregation mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSelection {
    pub month_offset: Option<MonthOffset>,
    pub date: Option<NaiveDate>,
    pub time: Option<HourOfDay>,
}

/// Full widget state for the Trending Stocks section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingSelection {
    pub mode: AggregationMode,
    pub top_n: TopN,
    pub time: TimeSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResolvedPeriod {
    All,
    Month(String),
    Day(NaiveDate),
    Hour(NaiveDateTime),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub mode: AggregationMode,
    pub resolved_period: ResolvedPeriod,
    pub top_n: TopN,
}
