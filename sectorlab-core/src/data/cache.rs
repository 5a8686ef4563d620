//! Freshness-gated dataset cache.
//!
//! Each run either reuses the current snapshot or regenerates it:
//! - The current snapshot is the one with the newest creation time in the store.
//! - Its name carries a creation date; the staleness policy compares that date to `now`.
//! - A missing snapshot, an unparsable date, or a stale date all trigger a refresh.
//! - A refresh fetches the ticker universe, classifies every ticker and writes a
//!   new snapshot named after `now`. Older snapshots are left in place.

use super::provider::{ClassifyProgress, ProviderError, SectorClassifier, TickerSource};
use super::snapshot::{DatasetSnapshot, SnapshotHandle, TickerSectorRecord};
use super::staleness::StalenessPolicy;
use super::store::{latest_snapshot, SnapshotStore, StoreError};
use crate::config::ConfigError;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures of the dataset cache.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl DatasetError {
    /// True when a refresh was refused because a snapshot with the same name exists.
    pub fn is_snapshot_exists(&self) -> bool {
        matches!(self, DatasetError::Storage(StoreError::AlreadyExists(_)))
    }
}

/// External collaborators needed to regenerate a dataset.
pub struct Collaborators {
    pub tickers: Box<dyn TickerSource>,
    pub classifier: Box<dyn SectorClassifier>,
}

/// Why the cache decided what it decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No snapshot in the store.
    Missing,
    /// The current snapshot's name carries no parsable date.
    Unparsable { name: String },
    /// Older than the policy allows.
    Stale { name: String, date: NaiveDate },
    /// Within the policy window.
    Fresh { name: String, date: NaiveDate },
}

impl Freshness {
    pub fn needs_update(&self) -> bool {
        !matches!(self, Freshness::Fresh { .. })
    }
}

/// One row of `DatasetCache::status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStatus {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub stale: bool,
    pub current: bool,
}

/// Snapshot cache over any `SnapshotStore`.
pub struct DatasetCache<S: SnapshotStore> {
    store: S,
    policy: StalenessPolicy,
}

impl<S: SnapshotStore> DatasetCache<S> {
    pub fn new(store: S, policy: StalenessPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Evaluate the current snapshot against the staleness policy.
    pub fn freshness(&self, now: NaiveDate) -> Result<Freshness, DatasetError> {
        let handles = self.store.list_snapshots()?;
        let Some(latest) = latest_snapshot(&handles) else {
            debug!("no snapshot found");
            return Ok(Freshness::Missing);
        };

        let freshness = match latest.date() {
            Ok(date) if self.policy.is_stale(now, date) => Freshness::Stale {
                name: latest.name.clone(),
                date,
            },
            Ok(date) => Freshness::Fresh {
                name: latest.name.clone(),
                date,
            },
            Err(e) => {
                warn!(snapshot = %latest.name, "{e}, assuming update is needed");
                Freshness::Unparsable {
                    name: latest.name.clone(),
                }
            }
        };
        debug!(?freshness, %now, "evaluated snapshot freshness");
        Ok(freshness)
    }

    /// Whether the dataset has to be regenerated as of `now`.
    pub fn needs_update(&self, now: NaiveDate) -> Result<bool, DatasetError> {
        Ok(self.freshness(now)?.needs_update())
    }

    /// Return the current dataset, regenerating it first when it is stale.
    ///
    /// `connect` is only invoked when a refresh is needed. It must fail with a
    /// configuration error before any network activity when credentials are
    /// missing.
    pub fn current_dataset<F>(
        &self,
        now: NaiveDate,
        connect: F,
        progress: &dyn ClassifyProgress,
    ) -> Result<DatasetSnapshot, DatasetError>
    where
        F: FnOnce() -> Result<Collaborators, DatasetError>,
    {
        if self.needs_update(now)? {
            let collaborators = connect()?;
            return self.refresh(now, &collaborators, progress);
        }

        let handles = self.store.list_snapshots()?;
        let handle = latest_snapshot(&handles)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("current snapshot".into()))?;
        let records = self.store.load_snapshot(&handle)?;
        info!(snapshot = %handle.name, records = records.len(), "reusing snapshot");
        Ok(DatasetSnapshot { handle, records })
    }

    /// Fetch, classify and persist a new snapshot dated `now`.
    pub fn refresh(
        &self,
        now: NaiveDate,
        collaborators: &Collaborators,
        progress: &dyn ClassifyProgress,
    ) -> Result<DatasetSnapshot, DatasetError> {
        let tickers = collaborators.tickers.fetch_tickers()?;
        if tickers.is_empty() {
            return Err(ProviderError::ResponseFormatChanged(format!(
                "{} returned no tickers (constituents table missing?)",
                collaborators.tickers.name()
            ))
            .into());
        }
        info!(source = collaborators.tickers.name(), count = tickers.len(), "fetched ticker universe");

        let total = tickers.len();
        progress.on_start(total);

        let mut records = Vec::with_capacity(total);
        for (i, ticker) in tickers.into_iter().enumerate() {
            let sector = collaborators.classifier.classify(&ticker)?;
            progress.on_classified(&ticker, &sector, i, total);
            records.push(TickerSectorRecord { ticker, sector });
        }

        let handle = self.store.create_snapshot(now, &records)?;
        progress.on_saved(&handle.name);
        info!(snapshot = %handle.name, records = records.len(), "wrote new snapshot");

        Ok(DatasetSnapshot { handle, records })
    }

    /// All snapshots, newest creation time first.
    pub fn status(&self, now: NaiveDate) -> Result<Vec<SnapshotStatus>, DatasetError> {
        let mut handles = self.store.list_snapshots()?;
        let current: Option<SnapshotHandle> = latest_snapshot(&handles).cloned();
        handles.sort_by(|a, b| (b.created_at, &b.name).cmp(&(a.created_at, &a.name)));

        Ok(handles
            .into_iter()
            .map(|h| {
                let date = h.date().ok();
                SnapshotStatus {
                    stale: date.map_or(true, |d| self.policy.is_stale(now, d)),
                    current: current.as_ref() == Some(&h),
                    date,
                    name: h.name,
                }
            })
            .collect())
    }
}
