use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::errors::AppError;

pub const TICKER_FILE: &str = "sp100.json";
pub const MAX_TICKERS: usize = 100;

/// Ticker symbols offered by the ticker selectors.
///
/// The list file is static for the lifetime of the process, so the first
/// successful load is kept and reused. Failed loads are retried on the next call.
#[derive(Clone)]
pub struct TickerListLoader {
    path: PathBuf,
    cached: Arc<RwLock<Option<Arc<Vec<String>>>>>,
}

impl TickerListLoader {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            path: base_path.as_ref().join("data").join(TICKER_FILE),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn load(&self) -> Result<Arc<Vec<String>>, AppError> {
        if let Some(tickers) = self.cached.read().as_ref() {
            return Ok(Arc::clone(tickers));
        }

        let mut slot = self.cached.write();
        // another request may have filled it while we waited for the lock
        if let Some(tickers) = slot.as_ref() {
            return Ok(Arc::clone(tickers));
        }

        let tickers = Arc::new(read_ticker_file(&self.path).map_err(|e| {
            error!("Failed to load ticker list from {:?}: {:#}", self.path, e);
            AppError::DataSource(format!("{:#}", e))
        })?);

        info!("Loaded {} tickers from {:?}", tickers.len(), self.path);
        *slot = Some(Arc::clone(&tickers));

        Ok(tickers)
    }

    pub fn contains(&self, ticker: &str) -> Result<bool, AppError> {
        Ok(self.load()?.iter().any(|t| t.eq_ignore_ascii_case(ticker)))
    }
}

fn read_ticker_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ticker list: {:?}", path))?;

    let raw: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("Ticker list is not a JSON array of strings: {:?}", path))?;

    Ok(raw
        .into_iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .take(MAX_TICKERS)
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) fn write_tickers(dir: &Path, tickers: &[&str]) {
        let data_dir = dir.join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join(TICKER_FILE), serde_json::to_string(tickers).unwrap()).unwrap();
    }

    #[test]
    fn test_loads_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write_tickers(dir.path(), &["MSFT", " aapl ", "", "TSLA"]);

        let tickers = TickerListLoader::new(dir.path()).load().unwrap();
        assert_eq!(*tickers, vec!["MSFT", "AAPL", "TSLA"]);
    }

    #[test]
    fn test_keeps_first_hundred() {
        let dir = tempfile::tempdir().unwrap();
        let symbols: Vec<String> = (0..150).map(|i| format!("T{}", i)).collect();
        let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
        write_tickers(dir.path(), &refs);

        let tickers = TickerListLoader::new(dir.path()).load().unwrap();
        assert_eq!(tickers.len(), MAX_TICKERS);
        assert_eq!(tickers[0], "T0");
        assert_eq!(tickers[99], "T99");
    }

    #[test]
    fn test_memoized_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        write_tickers(dir.path(), &["AAPL"]);
        let loader = TickerListLoader::new(dir.path());

        let first = loader.load().unwrap();
        fs::remove_file(dir.path().join("data").join(TICKER_FILE)).unwrap();
        let second = loader.clone().load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.contains("aapl").unwrap());
        assert!(!loader.contains("MSFT").unwrap());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TickerListLoader::new(dir.path());

        assert!(matches!(loader.load(), Err(AppError::DataSource(_))));

        write_tickers(dir.path(), &["NVDA"]);
        assert_eq!(*loader.load().unwrap(), vec!["NVDA"]);
    }

    #[test]
    fn test_rejects_non_string_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data").join(TICKER_FILE), "[1, 2, 3]").unwrap();

        assert!(TickerListLoader::new(dir.path()).load().is_err());
    }
}
