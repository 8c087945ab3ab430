pub mod chart_service;
pub mod ticker_service;
pub mod time_window_resolver;
