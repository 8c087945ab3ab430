use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{
    AggregationMode, DashboardOptions, HourOfDay, MonthOffset, RecentTweetsResponse,
    TickerTimeline, TickerTrendsResponse, TimeSelection, TopN, TrendingResponse,
    TrendingSelection,
};
use crate::services::chart_service;
use crate::state::AppState;

/// Choices of the "Recent tweets" selector.
pub const RECENT_TWEET_LIMITS: [usize; 6] = [10, 25, 50, 100, 500, 1000];

/// Selector value meaning "no ticker filter".
const NO_TICKER: &str = "None";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(get_options))
        .route("/trending", get(get_trending))
        .route("/recent-tweets", get(get_recent_tweets))
        .route("/tickers", get(get_tickers))
        .route("/ticker-trends", get(get_ticker_trends))
}

/// Widget values arrive as strings; empty strings count as "not set".
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidSelection(format!("Date must be formatted YYYY-MM-DD, got '{}'", value))
    })
}

fn parse_count(name: &str, value: &str) -> Result<usize, AppError> {
    value.parse::<usize>().map_err(|_| {
        AppError::InvalidSelection(format!("{} must be a number, got '{}'", name, value))
    })
}

fn log_rejection(route: &str, err: AppError) -> AppError {
    match &err {
        AppError::InvalidSelection(_) | AppError::UnsupportedMode(_) => {
            warn!("{} rejected: {}", route, err)
        }
        _ => {}
    }
    err
}

/// Query parameters of the Trending Stocks section
#[derive(Debug, Default, Deserialize)]
pub struct TrendingQuery {
    pub top: Option<String>,
    pub aggregation: Option<String>,
    pub month: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl TrendingQuery {
    /// Only the fields the chosen mode shows on screen are parsed.
    pub fn into_selection(self) -> Result<TrendingSelection, AppError> {
        let top_n = match non_empty(&self.top) {
            Some(top) => TopN::new(parse_count("Top", top)?)?,
            None => TopN::default(),
        };

        let mode = match non_empty(&self.aggregation) {
            Some(label) => label.parse::<AggregationMode>()?,
            None => AggregationMode::All,
        };

        let mut time = TimeSelection::default();
        match mode {
            AggregationMode::All => {}
            AggregationMode::Monthly => {
                time.month_offset = non_empty(&self.month)
                    .map(str::parse::<MonthOffset>)
                    .transpose()?;
            }
            AggregationMode::Daily | AggregationMode::Hourly => {
                time.date = non_empty(&self.date).map(parse_date).transpose()?;
                if mode == AggregationMode::Hourly {
                    time.time = non_empty(&self.time)
                        .map(str::parse::<HourOfDay>)
                        .transpose()?;
                }
            }
        }

        Ok(TrendingSelection { mode, top_n, time })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentTweetsQuery {
    pub limit: Option<String>,
    pub ticker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TickerTrendsQuery {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

/// GET /api/dashboard/options
async fn get_options(State(state): State<AppState>) -> Json<DashboardOptions> {
    let window = state.config.date_window;
    Json(DashboardOptions::new(
        window.min_date,
        window.max_date,
        state.resolver.supported_modes(),
        &RECENT_TWEET_LIMITS,
    ))
}

/// GET /api/dashboard/trending
/// Query params: top, aggregation, month, date, time
async fn get_trending(
    Query(params): Query<TrendingQuery>,
    State(state): State<AppState>,
) -> Result<Json<TrendingResponse>, AppError> {
    let selection = params
        .into_selection()
        .map_err(|e| log_rejection("GET /api/dashboard/trending", e))?;
    info!(
        "GET /api/dashboard/trending - {} top {}",
        selection.mode,
        selection.top_n.get()
    );

    let resolver = state.resolver.clone();
    let source = Arc::clone(&state.chart_data);
    let result = tokio::task::spawn_blocking(move || resolver.fetch(&selection, source.as_ref()))
        .await?
        .map_err(|e| log_rejection("GET /api/dashboard/trending", e))?;

    Ok(Json(TrendingResponse {
        leaderboard: chart_service::leaderboard(&result.rows),
        sentiment_breakdown: chart_service::sentiment_breakdown(&result.rows),
        metrics: chart_service::metric_cards(&result.rows),
        descriptor: result.descriptor,
        rows: result.rows,
    }))
}

/// GET /api/dashboard/recent-tweets
/// Query params: limit (default 10), ticker (default "None")
async fn get_recent_tweets(
    Query(params): Query<RecentTweetsQuery>,
    State(state): State<AppState>,
) -> Result<Json<RecentTweetsResponse>, AppError> {
    let limit = match non_empty(&params.limit) {
        Some(value) => parse_count("Recent tweets", value)?,
        None => RECENT_TWEET_LIMITS[0],
    };
    if !RECENT_TWEET_LIMITS.contains(&limit) {
        return Err(log_rejection(
            "GET /api/dashboard/recent-tweets",
            AppError::InvalidSelection(format!(
                "Recent tweets must be one of {:?}, got {}",
                RECENT_TWEET_LIMITS, limit
            )),
        ));
    }
    let ticker = non_empty(&params.ticker)
        .filter(|t| *t != NO_TICKER)
        .map(str::to_string);

    info!("GET /api/dashboard/recent-tweets - limit {} ticker {:?}", limit, ticker);

    let tweets = tokio::task::spawn_blocking(move || -> Result<_, AppError> {
        if let Some(ticker) = ticker.as_deref() {
            if !state.tickers.contains(ticker)? {
                return Err(AppError::InvalidSelection(format!("Unknown ticker '{}'", ticker)));
            }
        }
        Ok(state.chart_data.get_recent_tweets(limit, ticker.as_deref())?)
    })
    .await?
    .map_err(|e| log_rejection("GET /api/dashboard/recent-tweets", e))?;

    Ok(Json(RecentTweetsResponse {
        table: chart_service::tweet_table(&tweets),
        word_cloud: chart_service::word_cloud(&tweets, chart_service::WORD_CLOUD_SIZE),
        tweets,
    }))
}

/// GET /api/dashboard/tickers
async fn get_tickers(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    info!("GET /api/dashboard/tickers");

    let tickers = tokio::task::spawn_blocking(move || state.tickers.load()).await??;
    Ok(Json(tickers.as_ref().clone()))
}

/// GET /api/dashboard/ticker-trends
/// Query params: primary (default: first ticker), secondary (default "None")
async fn get_ticker_trends(
    Query(params): Query<TickerTrendsQuery>,
    State(state): State<AppState>,
) -> Result<Json<TickerTrendsResponse>, AppError> {
    info!(
        "GET /api/dashboard/ticker-trends - primary {:?} secondary {:?}",
        params.primary, params.secondary
    );

    let response = tokio::task::spawn_blocking(move || -> Result<TickerTrendsResponse, AppError> {
        let tickers = state.tickers.load()?;
        let lookup = |requested: &str| -> Result<String, AppError> {
            tickers
                .iter()
                .find(|t| t.eq_ignore_ascii_case(requested))
                .cloned()
                .ok_or_else(|| AppError::InvalidSelection(format!("Unknown ticker '{}'", requested)))
        };

        let primary = match non_empty(&params.primary) {
            Some(requested) => lookup(requested)?,
            None => tickers
                .first()
                .cloned()
                .ok_or_else(|| AppError::DataSource("Ticker list is empty".to_string()))?,
        };
        let secondary = non_empty(&params.secondary)
            .filter(|t| *t != NO_TICKER)
            .map(lookup)
            .transpose()?;

        let window = state.config.date_window;
        let timeline = |ticker: String| -> Result<TickerTimeline, AppError> {
            let points = state
                .chart_data
                .get_ticker_timeline(&ticker)?
                .into_iter()
                .filter(|p| window.contains(p.date))
                .collect();
            Ok(TickerTimeline { ticker, points })
        };

        Ok(TickerTrendsResponse {
            primary: timeline(primary)?,
            secondary: secondary.map(timeline).transpose()?,
        })
    })
    .await?
    .map_err(|e| log_rejection("GET /api/dashboard/ticker-trends", e))?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_app;
    use crate::config::{DashboardConfig, DateWindow};
    use crate::external::csv_chart_data::tests::{write_dataset, SAMPLE_TWEETS};
    use crate::services::ticker_service::tests::write_tickers;
    use crate::services::time_window_resolver::DispatchProfile;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(dir: &std::path::Path, profile: DispatchProfile) -> Router {
        write_dataset(dir, SAMPLE_TWEETS);
        write_tickers(dir, &["AAPL", "MSFT", "TSLA", "NVDA"]);

        let config = DashboardConfig {
            base_path: dir.to_path_buf(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            // max date 2023-02-28
            date_window: DateWindow::ending_yesterday(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()),
            dispatch: profile,
        };
        create_app(AppState::new(config))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let (status, body) = get(app, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_irrelevant_fields_are_ignored() {
        let query = TrendingQuery {
            top: Some("5".to_string()),
            aggregation: Some("All".to_string()),
            month: Some("garbage".to_string()),
            date: Some("not-a-date".to_string()),
            time: Some("99:00".to_string()),
        };

        let selection = query.into_selection().unwrap();
        assert_eq!(selection.mode, AggregationMode::All);
        assert_eq!(selection.time, TimeSelection::default());
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let query = TrendingQuery {
            top: Some("".to_string()),
            aggregation: Some("Monthly".to_string()),
            month: Some(" ".to_string()),
            ..Default::default()
        };

        let selection = query.into_selection().unwrap();
        assert_eq!(selection.top_n, TopN::default());
        assert_eq!(selection.time.month_offset, None);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_app(dir.path(), DispatchProfile::MonthlyOnly), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_trending_monthly() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::MonthlyOnly);

        let json = get_json(app, "/api/dashboard/trending?top=3&aggregation=Monthly&month=Current-0").await;

        assert_eq!(json["descriptor"]["resolved_period"]["value"], "02");
        assert_eq!(json["rows"][0]["TICKER"], "TSLA");
        assert_eq!(json["rows"][0]["NUM_MENTIONS"], 2);
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["leaderboard"][1]["ticker"], "MSFT");
        assert_eq!(json["metrics"][0]["value"], 3);
        assert_eq!(json["sentiment_breakdown"][0]["negative"], 0.5);
    }

    #[tokio::test]
    async fn test_trending_previous_month() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::MonthlyOnly);

        let json = get_json(app, "/api/dashboard/trending?top=5&aggregation=Monthly&month=Current-1").await;

        // 2023-02-28 minus 31 days is 2023-01-28
        assert_eq!(json["descriptor"]["resolved_period"]["value"], "01");
        assert_eq!(json["rows"][0]["TICKER"], "AAPL");
    }

    #[tokio::test]
    async fn test_trending_rejects_bad_top() {
        let dir = tempfile::tempdir().unwrap();

        for uri in [
            "/api/dashboard/trending?top=4&aggregation=Monthly&month=Current-0",
            "/api/dashboard/trending?top=ten&aggregation=Monthly&month=Current-0",
            "/api/dashboard/trending?top=5&aggregation=Weekly",
            "/api/dashboard/trending?top=5&aggregation=Monthly&month=Current-5",
        ] {
            let (status, _) = get(test_app(dir.path(), DispatchProfile::MonthlyOnly), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_trending_unsupported_modes() {
        let dir = tempfile::tempdir().unwrap();

        for uri in [
            "/api/dashboard/trending",
            "/api/dashboard/trending?aggregation=Daily&date=2023-01-05",
            "/api/dashboard/trending?aggregation=Hourly&date=2023-01-05&time=9:00",
        ] {
            let (status, body) = get(test_app(dir.path(), DispatchProfile::MonthlyOnly), uri).await;
            assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{}", uri);
            assert!(String::from_utf8_lossy(&body).contains("not yet supported"));
        }
    }

    #[tokio::test]
    async fn test_trending_daily_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::Complete);

        let (status, _) = get(app, "/api/dashboard/trending?aggregation=Daily&date=2023-03-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trending_hourly_with_complete_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::Complete);

        let json = get_json(
            app,
            "/api/dashboard/trending?top=3&aggregation=Hourly&date=2023-01-05&time=9:00",
        )
        .await;

        assert_eq!(json["descriptor"]["resolved_period"]["kind"], "hour");
        assert_eq!(json["rows"][0]["TICKER"], "AAPL");
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_data_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::MonthlyOnly);
        std::fs::remove_file(dir.path().join("data").join("tweets.csv")).unwrap();

        let (status, _) = get(app, "/api/dashboard/trending?aggregation=Monthly&month=Current-0").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_recent_tweets() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), DispatchProfile::MonthlyOnly);

        let json = get_json(app, "/api/dashboard/recent-tweets?limit=10&ticker=MSFT").await;

        let tweets = json["tweets"].as_array().unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0]["TEXT"], "MSFT new highs");
        assert_eq!(json["table"][0]["fill_color"], "green");
        assert!(json["word_cloud"]
            .as_array()
            .unwrap()
            .iter()
            .all(|w| !w["word"].as_str().unwrap().starts_with("http")));
    }

    #[tokio::test]
    async fn test_recent_tweets_validation() {
        let dir = tempfile::tempdir().unwrap();

        let (status, _) = get(
            test_app(dir.path(), DispatchProfile::MonthlyOnly),
            "/api/dashboard/recent-tweets?limit=7",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(
            test_app(dir.path(), DispatchProfile::MonthlyOnly),
            "/api/dashboard/recent-tweets?ticker=GME",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json = get_json(
            test_app(dir.path(), DispatchProfile::MonthlyOnly),
            "/api/dashboard/recent-tweets?ticker=None",
        )
        .await;
        assert_eq!(json["tweets"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_tickers_and_options() {
        let dir = tempfile::tempdir().unwrap();

        let tickers = get_json(test_app(dir.path(), DispatchProfile::MonthlyOnly), "/api/dashboard/tickers").await;
        assert_eq!(tickers, serde_json::json!(["AAPL", "MSFT", "TSLA", "NVDA"]));

        let options = get_json(test_app(dir.path(), DispatchProfile::MonthlyOnly), "/api/dashboard/options").await;
        assert_eq!(options["min_date"], "2022-10-27");
        assert_eq!(options["max_date"], "2023-02-28");
        assert_eq!(options["default_date"], "2023-02-28");
        assert_eq!(options["supported_modes"], serde_json::json!(["Monthly"]));
        assert_eq!(options["hour_options"].as_array().unwrap().len(), 24);
        assert_eq!(options["top_options"], serde_json::json!([3, 5, 10, 15]));
    }

    #[tokio::test]
    async fn test_ticker_trends() {
        let dir = tempfile::tempdir().unwrap();

        let json = get_json(
            test_app(dir.path(), DispatchProfile::MonthlyOnly),
            "/api/dashboard/ticker-trends?secondary=tsla",
        )
        .await;

        assert_eq!(json["primary"]["ticker"], "AAPL");
        assert_eq!(json["primary"]["points"].as_array().unwrap().len(), 2);
        assert_eq!(json["secondary"]["ticker"], "TSLA");
        assert_eq!(json["secondary"]["points"].as_array().unwrap().len(), 3);

        let json = get_json(
            test_app(dir.path(), DispatchProfile::MonthlyOnly),
            "/api/dashboard/ticker-trends?primary=NVDA&secondary=None",
        )
        .await;
        assert!(json["secondary"].is_null());
        assert_eq!(json["primary"]["points"][0]["date"], "2022-11-20");
    }
}
