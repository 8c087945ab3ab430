mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::logging::LoggingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = DashboardConfig::from_env()?;
    info!(
        "📅 Date window {} to {}, dispatch profile {:?}, data under {:?}",
        config.date_window.min_date,
        config.date_window.max_date,
        config.dispatch,
        config.data_dir()
    );

    let bind_addr = config.bind_addr;
    let state = AppState::new(config);

    // warm the ticker list; selectors still work later if the file shows up
    if let Err(e) = state.tickers.load() {
        warn!("Ticker list not available yet: {}", e);
    }

    let app = app::create_app(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("🚀 Tweet sentiment dashboard backend running at http://{}/", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
