//! Scrape orchestrator — sequential batch run over the configured sources.
//!
//! Issues are processed one at a time with a fixed politeness delay between
//! consecutive fetches; there are never concurrent in-flight requests to a
//! source. Per-issue failures are skips, only the aggregate empty result
//! aborts the run.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::assemble::{assemble, EmptyResultError};
use crate::reconcile::{cross_check_first_tier, merge_partials, SourcePriority};
use crate::record::{DrawRecord, IssueId};
use crate::sources::DrawSource;

/// Progress callback for batch scrapes.
pub trait ScrapeProgress: Send {
    /// Called before the first fetch for an issue.
    fn on_issue_start(&self, issue: &str, index: usize, total: usize);

    /// Called once every source has answered for an issue; `recognized` is
    /// false when no source produced a partial record.
    fn on_issue_complete(&self, issue: &str, index: usize, total: usize, recognized: bool);

    /// Called when the whole batch is done.
    fn on_batch_complete(&self, recovered: usize, skipped: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ScrapeProgress for StdoutProgress {
    fn on_issue_start(&self, issue: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching issue {issue}...", index + 1, total);
    }

    fn on_issue_complete(&self, issue: &str, _index: usize, _total: usize, recognized: bool) {
        if recognized {
            println!("  OK: {issue}");
        } else {
            println!("  SKIP: {issue} (no source recognized the page)");
        }
    }

    fn on_batch_complete(&self, recovered: usize, skipped: usize, total: usize) {
        println!("\nScrape complete: {recovered}/{total} issue(s) recovered, {skipped} skipped");
    }
}

/// Silent progress sink for library callers and tests.
pub struct NullProgress;

impl ScrapeProgress for NullProgress {
    fn on_issue_start(&self, _issue: &str, _index: usize, _total: usize) {}
    fn on_issue_complete(&self, _issue: &str, _index: usize, _total: usize, _recognized: bool) {}
    fn on_batch_complete(&self, _recovered: usize, _skipped: usize, _total: usize) {}
}

/// Outcome of a batch scrape. Partial success is visible: `recovered` may be
/// smaller than `requested`.
#[derive(Debug)]
pub struct ScrapeSummary {
    pub requested: usize,
    pub recovered: usize,
    pub skipped: usize,
    pub records: Vec<DrawRecord>,
    pub warnings: Vec<String>,
}

/// Scrape the most recent `limit` issues.
///
/// The issue list comes from the first source whose listing yields ids;
/// sources whose listing fails or is empty are noted as warnings. Each issue
/// is then offered to every source, the partials are merged by priority,
/// cross-checked against the specialist ledger when one is supplied, and the
/// merged batch is assembled into the final ordered dataset.
pub fn scrape_recent(
    sources: &[Box<dyn DrawSource>],
    priority: &SourcePriority,
    cross_check: Option<&BTreeMap<IssueId, u32>>,
    limit: usize,
    issue_delay: Duration,
    progress: &dyn ScrapeProgress,
) -> Result<ScrapeSummary, EmptyResultError> {
    let mut warnings = Vec::new();

    let mut issues: Vec<IssueId> = Vec::new();
    for source in sources {
        match source.list_recent_issues(limit) {
            Ok(list) if !list.is_empty() => {
                issues = list;
                break;
            }
            Ok(_) => warnings.push(format!(
                "{}: listing page had no recognizable issue ids",
                source.name()
            )),
            Err(e) => warnings.push(format!("{}: listing fetch failed: {e}", source.name())),
        }
    }

    let requested = issues.len();
    let mut merged_batch = Vec::with_capacity(requested);

    for (index, issue) in issues.iter().enumerate() {
        if index > 0 {
            // Politeness toward the scraped sites, not a performance knob.
            std::thread::sleep(issue_delay);
        }
        progress.on_issue_start(issue, index, requested);

        let mut partials = Vec::new();
        for source in sources {
            if let Some(partial) = source.parse_issue(issue) {
                partials.push((source.name().to_string(), partial));
            }
        }

        let recognized = !partials.is_empty();
        if recognized {
            let merged = merge_partials(issue, &partials, priority, &mut warnings);
            if let Some(totals) = cross_check {
                cross_check_first_tier(issue, &merged, totals, &mut warnings);
            }
            merged_batch.push(merged);
        }
        progress.on_issue_complete(issue, index, requested, recognized);
    }

    let records = assemble(merged_batch, requested, &mut warnings)?;
    let recovered = records.len();
    progress.on_batch_complete(recovered, requested - recovered, requested);

    Ok(ScrapeSummary {
        requested,
        recovered,
        skipped: requested - recovered,
        records,
        warnings,
    })
}
