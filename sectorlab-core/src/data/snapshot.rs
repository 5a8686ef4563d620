//! Dated ticker/sector snapshots and their CSV encoding.
//!
//! File name: `{YYYY-MM-DD}_sp500_tickers_sectors.csv`
//!
//! Columns: `Ticker,Sector`, header row present, one row per classified ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::time::SystemTime;
use thiserror::Error;

/// Suffix shared by every snapshot file name.
pub const SNAPSHOT_SUFFIX: &str = "_sp500_tickers_sectors.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One classified ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSectorRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Sector")]
    pub sector: String,
}

impl TickerSectorRecord {
    pub fn new(ticker: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            sector: sector.into(),
        }
    }
}

/// The embedded date of a snapshot name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date prefix in snapshot name '{name}'")]
pub struct SnapshotNameError {
    pub name: String,
}

/// Reference to a persisted snapshot, as discovered in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    pub name: String,
    /// File-system creation time. Decides which snapshot is current.
    pub created_at: SystemTime,
}

impl SnapshotHandle {
    pub fn new(name: impl Into<String>, created_at: SystemTime) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }

    /// Creation date embedded in the name.
    pub fn date(&self) -> Result<NaiveDate, SnapshotNameError> {
        parse_snapshot_date(&self.name)
    }
}

/// A snapshot handle together with its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSnapshot {
    pub handle: SnapshotHandle,
    pub records: Vec<TickerSectorRecord>,
}

impl DatasetSnapshot {
    pub fn name(&self) -> &str {
        &self.handle.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `2024-06-01` → `2024-06-01_sp500_tickers_sectors.csv`
pub fn snapshot_name(date: NaiveDate) -> String {
    format!("{}{SNAPSHOT_SUFFIX}", date.format(DATE_FORMAT))
}

/// Whether a file name follows the snapshot naming pattern (`*_sp500_tickers_sectors.csv`).
///
/// The date part may be empty or unparsable; such names still match and are
/// treated as stale by the cache.
pub fn is_snapshot_name(name: &str) -> bool {
    name.ends_with(SNAPSHOT_SUFFIX)
}

/// Extract the date from everything before the first underscore.
pub fn parse_snapshot_date(name: &str) -> Result<NaiveDate, SnapshotNameError> {
    let err = || SnapshotNameError {
        name: name.to_string(),
    };
    let prefix = name.split('_').next().ok_or_else(err)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).map_err(|_| err())
}

/// Serialize records as CSV with a `Ticker,Sector` header.
pub fn write_records<W: Write>(writer: W, records: &[TickerSectorRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["Ticker", "Sector"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse records from CSV, preserving row order.
pub fn read_records<R: Read>(reader: R) -> csv::Result<Vec<TickerSectorRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize().collect()
}
