//! Reconciler — merge per-source partials for one issue into one record.
//!
//! Merge is field-by-field: each field group walks its configured source
//! priority and takes the first non-null value, so lower-priority sources
//! only fill gaps and never override. The distribution specialist ledger is
//! consulted for cross-checking only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{IssueId, PartialDrawRecord};

/// Source orderings per field group; fixed configuration, read-only at run
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePriority {
    /// Numbers and draw date.
    pub core_fields: Vec<String>,
    /// Sales, jackpot pool, first-tier count.
    pub finance_fields: Vec<String>,
    /// First-tier region list (raw text and its parsed map travel together).
    pub distribution_fields: Vec<String>,
}

impl Default for SourcePriority {
    fn default() -> Self {
        Self {
            core_fields: vec!["yiqicai".into(), "17500".into(), "zhcw".into()],
            finance_fields: vec!["zhcw".into(), "yiqicai".into(), "17500".into()],
            distribution_fields: vec!["yiqicai".into(), "17500".into()],
        }
    }
}

/// First non-null value for a field, walking `order` over the partials.
fn pick<T, F>(order: &[String], partials: &[(String, PartialDrawRecord)], get: F) -> Option<T>
where
    F: Fn(&PartialDrawRecord) -> Option<T>,
{
    for source in order {
        for (name, partial) in partials {
            if name == source {
                if let Some(value) = get(partial) {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Merge the partials produced for one issue by the configured sources.
///
/// `maxRegionCount` never appears here: it is derived from the merged map at
/// record-construction time, never taken from a source.
pub fn merge_partials(
    issue: &str,
    partials: &[(String, PartialDrawRecord)],
    priority: &SourcePriority,
    warnings: &mut Vec<String>,
) -> PartialDrawRecord {
    let mut merged = PartialDrawRecord::new(issue);

    merged.draw_date = pick(&priority.core_fields, partials, |p| p.draw_date);
    merged.reds = pick(&priority.core_fields, partials, |p| p.reds);
    merged.blue = pick(&priority.core_fields, partials, |p| p.blue);

    merged.sales_yuan = pick(&priority.finance_fields, partials, |p| p.sales_yuan);
    merged.pool_yuan = pick(&priority.finance_fields, partials, |p| p.pool_yuan);
    merged.first_tier_count = pick(&priority.finance_fields, partials, |p| p.first_tier_count);

    // The parsed map is derived from the raw text, so both come from the
    // same source: the highest-priority one that saw any region data.
    if let Some((raw, parsed)) = pick(&priority.distribution_fields, partials, |p| {
        if p.first_tier_regions_raw.is_some() || !p.first_tier_regions.is_empty() {
            Some((p.first_tier_regions_raw.clone(), p.first_tier_regions.clone()))
        } else {
            None
        }
    }) {
        merged.first_tier_regions_raw = raw;
        merged.first_tier_regions = parsed;
    }

    // Cross-check, never override: when the winning source's raw text failed
    // to parse, note any source that did parse region entries.
    if merged.first_tier_regions_raw.is_some() && merged.first_tier_regions.is_empty() {
        if let Some((name, other)) = partials
            .iter()
            .find(|(_, p)| !p.first_tier_regions.is_empty())
        {
            warnings.push(format!(
                "{issue}: region text from the primary source did not parse; \
                 {name} parsed {} region(s) (cross-check only, not merged)",
                other.first_tier_regions.len()
            ));
        }
    }

    merged
}

/// Compare a merged record against the specialist per-issue totals ledger.
///
/// Emits warnings only; the ledger binds totals to issue ids with no
/// guaranteed region alignment, so it never overrides a merged value.
pub fn cross_check_first_tier(
    issue: &str,
    merged: &PartialDrawRecord,
    totals: &BTreeMap<IssueId, u32>,
    warnings: &mut Vec<String>,
) {
    let Some(&ledger_total) = totals.get(issue) else {
        return;
    };

    if merged.first_tier_regions_raw.is_some() && merged.first_tier_regions.is_empty() {
        warnings.push(format!(
            "{issue}: region text did not parse; specialist page reports {ledger_total} first-tier win(s)"
        ));
    } else if !merged.first_tier_regions.is_empty() {
        let parsed_total: u32 = merged.first_tier_regions.values().sum();
        if parsed_total != ledger_total {
            warnings.push(format!(
                "{issue}: parsed region counts sum to {parsed_total} but specialist page reports {ledger_total}"
            ));
        }
    }
}
