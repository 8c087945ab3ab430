use chrono::{Datelike, Duration};
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::DateWindow;
use crate::errors::AppError;
use crate::external::chart_data::ChartDataSource;
use crate::models::{
    AggregationMode, QueryDescriptor, ResolvedPeriod, TickerMetricsRow, TrendingSelection,
};

/// Days subtracted per month offset. "Current-1" is the month that was
/// current 31 days before the latest day, not the previous calendar month.
const MONTH_STRIDE_DAYS: i64 = 31;

pub type RetrievalFn =
    fn(&dyn ChartDataSource, &ResolvedPeriod, usize) -> Result<Vec<TickerMetricsRow>, AppError>;

/// Which aggregation modes have a retrieval function wired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchProfile {
    /// Only Monthly is served; the other modes report UnsupportedMode.
    MonthlyOnly,
    /// Every mode is served by its matching retrieval function.
    Complete,
}

impl FromStr for DispatchProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "monthly-only" => Ok(DispatchProfile::MonthlyOnly),
            "complete" => Ok(DispatchProfile::Complete),
            _ => Err(format!(
                "Unknown dispatch profile '{}'. Must be 'monthly' or 'complete'",
                s
            )),
        }
    }
}

fn period_mismatch(mode: AggregationMode, period: &ResolvedPeriod) -> AppError {
    AppError::Internal(format!(
        "{} retrieval received a {:?} period",
        mode, period
    ))
}

fn fetch_all(
    source: &dyn ChartDataSource,
    _period: &ResolvedPeriod,
    top: usize,
) -> Result<Vec<TickerMetricsRow>, AppError> {
    Ok(source.get_all_data(top)?)
}

fn fetch_month(
    source: &dyn ChartDataSource,
    period: &ResolvedPeriod,
    top: usize,
) -> Result<Vec<TickerMetricsRow>, AppError> {
    match period {
        ResolvedPeriod::Month(month) => Ok(source.get_data_for_month(month, top)?),
        other => Err(period_mismatch(AggregationMode::Monthly, other)),
    }
}

fn fetch_day(
    source: &dyn ChartDataSource,
    period: &ResolvedPeriod,
    top: usize,
) -> Result<Vec<TickerMetricsRow>, AppError> {
    match period {
        ResolvedPeriod::Day(day) => Ok(source.get_data_for_day(*day, top)?),
        other => Err(period_mismatch(AggregationMode::Daily, other)),
    }
}

fn fetch_hour(
    source: &dyn ChartDataSource,
    period: &ResolvedPeriod,
    top: usize,
) -> Result<Vec<TickerMetricsRow>, AppError> {
    match period {
        ResolvedPeriod::Hour(hour) => Ok(source.get_data_for_hour(*hour, top)?),
        other => Err(period_mismatch(AggregationMode::Hourly, other)),
    }
}

/// Retrieval functions indexed by aggregation mode.
#[derive(Clone, Copy)]
pub struct DispatchTable {
    entries: [Option<RetrievalFn>; 4],
}

impl DispatchTable {
    pub fn for_profile(profile: DispatchProfile) -> Self {
        let mut entries: [Option<RetrievalFn>; 4] = [None; 4];
        entries[AggregationMode::Monthly.index()] = Some(fetch_month);

        if profile == DispatchProfile::Complete {
            entries[AggregationMode::All.index()] = Some(fetch_all);
            entries[AggregationMode::Daily.index()] = Some(fetch_day);
            entries[AggregationMode::Hourly.index()] = Some(fetch_hour);
        }

        Self { entries }
    }

    pub fn lookup(&self, mode: AggregationMode) -> Option<RetrievalFn> {
        self.entries[mode.index()]
    }

    pub fn supported_modes(&self) -> Vec<AggregationMode> {
        AggregationMode::ALL_MODES
            .into_iter()
            .filter(|mode| self.lookup(*mode).is_some())
            .collect()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("supported_modes", &self.supported_modes())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendingResult {
    pub descriptor: QueryDescriptor,
    pub rows: Vec<TickerMetricsRow>,
}

/// Turns the Trending Stocks widget state into a query and runs it.
///
/// Holds no data between calls; every request is resolved from scratch
/// against the injected date window.
#[derive(Debug, Clone)]
pub struct TimeWindowResolver {
    window: DateWindow,
    table: DispatchTable,
}

impl TimeWindowResolver {
    pub fn new(window: DateWindow, profile: DispatchProfile) -> Self {
        Self {
            window,
            table: DispatchTable::for_profile(profile),
        }
    }

    pub fn supported_modes(&self) -> Vec<AggregationMode> {
        self.table.supported_modes()
    }

    pub fn resolve(&self, selection: &TrendingSelection) -> Result<QueryDescriptor, AppError> {
        let resolved_period = match selection.mode {
            AggregationMode::All => ResolvedPeriod::All,
            AggregationMode::Monthly => {
                let offset = selection.time.month_offset.ok_or_else(|| {
                    AppError::InvalidSelection("Monthly aggregation requires a month".to_string())
                })?;
                let target = self.window.max_date
                    - Duration::days(MONTH_STRIDE_DAYS * i64::from(offset.get()));
                ResolvedPeriod::Month(format!("{:02}", target.month()))
            }
            AggregationMode::Daily => ResolvedPeriod::Day(self.checked_date(selection)?),
            AggregationMode::Hourly => {
                let date = self.checked_date(selection)?;
                let time = selection.time.time.ok_or_else(|| {
                    AppError::InvalidSelection("Hourly aggregation requires a time".to_string())
                })?;
                let hour = date.and_hms_opt(time.hour(), 0, 0).ok_or_else(|| {
                    AppError::InvalidSelection(format!("Invalid time {}", time))
                })?;
                ResolvedPeriod::Hour(hour)
            }
        };

        let descriptor = QueryDescriptor {
            mode: selection.mode,
            resolved_period,
            top_n: selection.top_n,
        };
        debug!("Resolved trending selection to {:?}", descriptor);

        Ok(descriptor)
    }

    /// Resolves the selection and calls the retrieval function mapped to its mode.
    pub fn fetch(
        &self,
        selection: &TrendingSelection,
        source: &dyn ChartDataSource,
    ) -> Result<TrendingResult, AppError> {
        let descriptor = self.resolve(selection)?;

        let retrieve = self.table.lookup(descriptor.mode).ok_or_else(|| {
            warn!("No retrieval function for aggregation mode {}", descriptor.mode);
            AppError::UnsupportedMode(descriptor.mode)
        })?;

        let rows = retrieve(source, &descriptor.resolved_period, descriptor.top_n.get())?;
        info!(
            "Fetched {} trending rows for {} {:?}",
            rows.len(),
            descriptor.mode,
            descriptor.resolved_period
        );

        Ok(TrendingResult { descriptor, rows })
    }

    fn checked_date(&self, selection: &TrendingSelection) -> Result<chrono::NaiveDate, AppError> {
        let date = selection.time.date.ok_or_else(|| {
            AppError::InvalidSelection(format!("{} aggregation requires a date", selection.mode))
        })?;

        if !self.window.contains(date) {
            return Err(AppError::InvalidSelection(format!(
                "Date {} is outside the available range {} to {}",
                date, self.window.min_date, self.window.max_date
            )));
        }

        Ok(date)
    }
}
