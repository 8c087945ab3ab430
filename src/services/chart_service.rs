use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::models::{
    LeaderboardBar, MetricCard, RecentTweet, Sentiment, SentimentShare, TickerMetricsRow,
    TweetTableRow, WordWeight,
};

pub const WORD_CLOUD_SIZE: usize = 100;

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me",
    "more", "my", "no", "not", "now", "of", "on", "or", "our", "out", "rt", "she", "so", "than",
    "that", "the", "their", "them", "then", "there", "they", "this", "to", "up", "us", "was",
    "we", "were", "what", "when", "which", "who", "will", "with", "would", "you", "your",
];

pub fn leaderboard(rows: &[TickerMetricsRow]) -> Vec<LeaderboardBar> {
    rows.iter()
        .map(|row| LeaderboardBar {
            ticker: row.ticker.clone(),
            mentions: row.num_mentions,
        })
        .collect()
}

pub fn sentiment_breakdown(rows: &[TickerMetricsRow]) -> Vec<SentimentShare> {
    rows.iter()
        .map(|row| {
            let share = |count: u64| {
                if row.num_mentions == 0 {
                    0.0
                } else {
                    count as f64 / row.num_mentions as f64
                }
            };
            SentimentShare {
                ticker: row.ticker.clone(),
                positive: share(row.num_positive),
                negative: share(row.num_negative),
                neutral: share(row.num_neutral),
            }
        })
        .collect()
}

/// Total / +ve / Neu / -ve cards, summed over the rows on screen.
pub fn metric_cards(rows: &[TickerMetricsRow]) -> Vec<MetricCard> {
    let sum = |f: fn(&TickerMetricsRow) -> u64| rows.iter().map(f).sum::<u64>();

    vec![
        MetricCard { label: "Total Tweets".to_string(), value: sum(|r| r.num_mentions) },
        MetricCard { label: "+ve Tweets".to_string(), value: sum(|r| r.num_positive) },
        MetricCard { label: "Neu Tweets".to_string(), value: sum(|r| r.num_neutral) },
        MetricCard { label: "-ve Tweets".to_string(), value: sum(|r| r.num_negative) },
    ]
}

pub fn sentiment_color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "green",
        Sentiment::Negative => "red",
        Sentiment::Neutral => "lightskyblue",
    }
}

pub fn tweet_table(tweets: &[RecentTweet]) -> Vec<TweetTableRow> {
    tweets
        .iter()
        .map(|tweet| TweetTableRow {
            text: tweet.text.clone(),
            fill_color: sentiment_color(tweet.sentiment).to_string(),
        })
        .collect()
}

/// Word counts over all tweet texts, highest first, ties alphabetical.
pub fn word_cloud(tweets: &[RecentTweet], size: usize) -> Vec<WordWeight> {
    let noise_re = Regex::new(r"https?://\S+|@\w+").unwrap();
    let word_re = Regex::new(r"[a-z][a-z']+").unwrap();
    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for tweet in tweets {
        let lowered = tweet.text.to_lowercase();
        let cleaned = noise_re.replace_all(&lowered, " ");
        for word in word_re.find_iter(&cleaned) {
            let word = word.as_str();
            // possessives count toward the bare word
            let word = word.strip_suffix("'s").unwrap_or(word).trim_end_matches('\'');
            if word.len() < 2 || stop_words.contains(word) {
                continue;
            }
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    let mut weights: Vec<WordWeight> = counts
        .into_iter()
        .map(|(word, count)| WordWeight { word, count })
        .collect();
    weights.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    weights.truncate(size);
    weights
}
