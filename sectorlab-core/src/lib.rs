//! SectorLab Core — sector snapshot cache, scrapers, LLM providers, trade planning.
//!
//! - Dated ticker/sector snapshots stored as CSV
//! - Freshness-gated cache that reuses or regenerates the current snapshot
//! - S&P 500 universe scraper and chat-completion classifier/summarizer
//! - News headline scraping
//! - Sector-basket long/short planning

pub mod config;
pub mod data;
pub mod news;
pub mod trade;

pub use config::{ApiKey, AppConfig, ConfigError};
pub use data::{DatasetCache, DatasetError, DatasetSnapshot, DirectoryStore};
