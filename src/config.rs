use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::services::time_window_resolver::DispatchProfile;

/// First day with collected tweets.
pub const HISTORY_START: (i32, u32, u32) = (2022, 10, 27);

/// Selectable date range for the Daily/Hourly pickers.
///
/// `max_date` is the day before process start: same-day data is still being
/// ingested upstream and is never offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl DateWindow {
    pub fn ending_yesterday(today: NaiveDate) -> Self {
        let (y, m, d) = HISTORY_START;
        Self {
            min_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            max_date: today - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min_date <= date && date <= self.max_date
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub date_window: DateWindow,
    pub dispatch: DispatchProfile,
}

impl DashboardConfig {
    /// Reads the environment once at startup. `.env` must already be loaded.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, with the documented defaults
    /// for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_path =
            PathBuf::from(lookup("DASHBOARD_BASE_PATH").unwrap_or_else(|| ".".to_string()));

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:3000")?;

        let dispatch = lookup("DASHBOARD_DISPATCH")
            .unwrap_or_else(|| "monthly".to_string())
            .parse::<DispatchProfile>()
            .map_err(anyhow::Error::msg)
            .context("Invalid DASHBOARD_DISPATCH")?;

        let config = Self {
            base_path,
            bind_addr,
            date_window: DateWindow::ending_yesterday(Local::now().date_naive()),
            dispatch,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_path.is_dir() {
            bail!("DASHBOARD_BASE_PATH {:?} is not a directory", self.base_path);
        }
        if self.date_window.max_date < self.date_window.min_date {
            bail!(
                "Date window is empty: {} is after {}",
                self.date_window.min_date,
                self.date_window.max_date
            );
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_path.join("data")
    }
}
