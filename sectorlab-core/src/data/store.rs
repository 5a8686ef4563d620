//! Snapshot storage.
//!
//! `SnapshotStore` abstracts "scan a location for snapshot files, create a new
//! one, read one back" so the freshness policy can be exercised against an
//! in-memory fake. `DirectoryStore` is the file-system implementation: one CSV
//! per snapshot, flat in a single directory.

use super::snapshot::{
    is_snapshot_name, read_records, snapshot_name, write_records, SnapshotHandle,
    TickerSectorRecord,
};
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot '{0}' already exists and will not be overwritten")]
    AlreadyExists(String),

    #[error("snapshot '{0}' not found")]
    NotFound(String),

    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in snapshot '{name}': {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
}

/// Where snapshots live.
pub trait SnapshotStore {
    /// Every snapshot currently discoverable, in no particular order.
    fn list_snapshots(&self) -> Result<Vec<SnapshotHandle>, StoreError>;

    /// Persist `records` as a new snapshot named after `date`.
    ///
    /// Fails with `AlreadyExists` instead of replacing an existing snapshot.
    fn create_snapshot(
        &self,
        date: NaiveDate,
        records: &[TickerSectorRecord],
    ) -> Result<SnapshotHandle, StoreError>;

    /// Read a snapshot's records back, in stored order.
    fn load_snapshot(&self, handle: &SnapshotHandle) -> Result<Vec<TickerSectorRecord>, StoreError>;
}

/// The snapshot with the newest creation time. Equal times fall back to the greatest name.
pub fn latest_snapshot(handles: &[SnapshotHandle]) -> Option<&SnapshotHandle> {
    handles
        .iter()
        .max_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)))
}

/// Snapshots stored as CSV files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a snapshot file.
    pub fn path_of(&self, handle: &SnapshotHandle) -> PathBuf {
        self.dir.join(&handle.name)
    }

    fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SnapshotStore for DirectoryStore {
    fn list_snapshots(&self) -> Result<Vec<SnapshotHandle>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut handles = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(Self::io_err(&self.dir))?;

        for entry in entries {
            let entry = entry.map_err(Self::io_err(&self.dir))?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_snapshot_name(name) {
                continue;
            }

            // Follows symlinks; a dangling link is not a snapshot
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "skipping dangling snapshot link");
                    continue;
                }
                Err(e) => return Err(Self::io_err(&path)(e)),
            };
            if !meta.is_file() {
                continue;
            }
            // Not every file system records birth time
            let created_at = meta
                .created()
                .or_else(|_| meta.modified())
                .map_err(Self::io_err(&path))?;

            handles.push(SnapshotHandle::new(name, created_at));
        }

        Ok(handles)
    }

    fn create_snapshot(
        &self,
        date: NaiveDate,
        records: &[TickerSectorRecord],
    ) -> Result<SnapshotHandle, StoreError> {
        let name = snapshot_name(date);
        let path = self.dir.join(&name);

        let mut buf = Vec::new();
        write_records(&mut buf, records).map_err(|source| StoreError::Csv {
            name: name.clone(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(Self::io_err(&self.dir))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(name.clone())
                } else {
                    StoreError::Io {
                        path: path.clone(),
                        source: e,
                    }
                }
            })?;

        if let Err(e) = file.write_all(&buf).and_then(|_| file.sync_all()) {
            // Leave no half-written snapshot behind
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StoreError::Io { path, source: e });
        }

        let meta = file.metadata().map_err(Self::io_err(&path))?;
        let created_at = meta
            .created()
            .or_else(|_| meta.modified())
            .map_err(Self::io_err(&path))?;

        Ok(SnapshotHandle::new(name, created_at))
    }

    fn load_snapshot(&self, handle: &SnapshotHandle) -> Result<Vec<TickerSectorRecord>, StoreError> {
        let path = self.path_of(handle);
        let file = fs::File::open(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(handle.name.clone())
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        read_records(file).map_err(|source| StoreError::Csv {
            name: handle.name.clone(),
            source,
        })
    }
}
