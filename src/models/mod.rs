mod selection;
mod metrics;
mod charts;

pub use selection::{
    AggregationMode, HourOfDay, MonthOffset, QueryDescriptor, ResolvedPeriod, TimeSelection,
    TopN, TrendingSelection,
};
pub use metrics::{RecentTweet, Sentiment, TickerMetricsRow, TimelinePoint};
pub use charts::{
    DashboardOptions, LeaderboardBar, MetricCard, RecentTweetsResponse, SentimentShare,
    TickerTimeline, TickerTrendsResponse, TrendingResponse, TweetTableRow, WordWeight,
};
