//! Snapshot storage, freshness, and the external data providers

pub mod cache;
pub mod http;
pub mod openai;
pub mod provider;
pub mod snapshot;
pub mod staleness;
pub mod store;
pub mod universe;

pub use cache::{Collaborators, DatasetCache, DatasetError, Freshness, SnapshotStatus};
pub use openai::OpenAiClient;
pub use provider::{
    ClassifyProgress, HeadlineSource, HeadlineSummarizer, NoProgress, ProviderError,
    SectorClassifier, StdoutProgress, TickerSource,
};
pub use snapshot::{DatasetSnapshot, SnapshotHandle, SnapshotNameError, TickerSectorRecord};
pub use staleness::StalenessPolicy;
pub use store::{DirectoryStore, SnapshotStore, StoreError};
pub use universe::WikipediaUniverse;
