//! DrawLab Core — multi-source draw-record extraction pipeline.
//!
//! This crate contains the whole pipeline:
//! - Record types (complete and partial draw records)
//! - Free-text normalizers for money amounts and winner-region lists
//! - Page fetcher with a mirror-transport fallback
//! - Pattern-driven source adapters (one implementation, per-source config)
//! - Field-priority reconciler with a specialist cross-check ledger
//! - Dataset assembler and fixed-column CSV export

pub mod assemble;
pub mod crosscheck;
pub mod export;
pub mod fetch;
pub mod html;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod scrape;
pub mod sources;

pub use assemble::EmptyResultError;
pub use fetch::{FetchConfig, FetchError, HttpFetcher, PageFetcher};
pub use reconcile::SourcePriority;
pub use record::{DrawRecord, IssueId, PartialDrawRecord};
pub use scrape::{scrape_recent, ScrapeProgress, ScrapeSummary, StdoutProgress};
pub use sources::{DrawSource, PatternSource, SourceSpec};
