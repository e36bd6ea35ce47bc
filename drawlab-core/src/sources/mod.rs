//! Source adapters — one implementation, per-source configuration.
//!
//! Every source differs only in its URLs and text patterns, so there is a
//! single `PatternSource` driven by `SourceSpec` config objects instead of
//! one hand-written adapter per site.

pub mod catalog;
pub mod pattern;

pub use catalog::{cn17500, default_sources, yiqicai, zhcw};
pub use pattern::{PatternSource, SourceKind, SourceSpec};

use crate::fetch::FetchError;
use crate::record::{IssueId, PartialDrawRecord};

/// Capability set every draw source exposes.
///
/// Implementations absorb their own fetch failures: a page that cannot be
/// retrieved or recognized yields `None` from `parse_issue`, never an error
/// that would abort the batch.
pub trait DrawSource: Send + Sync {
    /// Human-readable source name, used in priority configuration.
    fn name(&self) -> &str;

    /// Distinct issue ids from the source's listing page, first-seen order
    /// (most recent first as presented), truncated to `limit`. An empty
    /// listing is not an error.
    fn list_recent_issues(&self, limit: usize) -> Result<Vec<IssueId>, FetchError>;

    /// Parse one issue into a partial record, or `None` when the page is
    /// unavailable or its format is not recognized for this issue.
    fn parse_issue(&self, issue: &str) -> Option<PartialDrawRecord>;
}
