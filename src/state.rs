use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::external::chart_data::ChartDataSource;
use crate::external::csv_chart_data::CsvChartData;
use crate::services::ticker_service::TickerListLoader;
use crate::services::time_window_resolver::TimeWindowResolver;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub chart_data: Arc<dyn ChartDataSource>,
    pub resolver: TimeWindowResolver,
    pub tickers: TickerListLoader,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            chart_data: Arc::new(CsvChartData::new(&config.base_path)),
            resolver: TimeWindowResolver::new(config.date_window, config.dispatch),
            tickers: TickerListLoader::new(&config.base_path),
            config: Arc::new(config),
        }
    }
}
