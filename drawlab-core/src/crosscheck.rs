//! Specialist first-tier ledger.
//!
//! One page lists per-issue first-tier winner counts for roughly the last
//! thousand issues. Its layout binds counts to issue ids but not reliably to
//! regions, so the pipeline uses it only as a cross-check ledger (see
//! `reconcile::cross_check_first_tier`).

use std::collections::BTreeMap;

use regex::Regex;

use crate::fetch::{FetchError, PageFetcher};
use crate::html;
use crate::record::IssueId;

pub const DEFAULT_TOTALS_URL: &str = "https://www.yiqicai.com/kj/ssqkj/ydjmx.html";

/// Fetch the specialist page and total the winner counts per issue id.
///
/// Counts for an issue mentioned in several region blocks are summed.
pub fn fetch_first_tier_totals(
    fetcher: &dyn PageFetcher,
    url: &str,
) -> Result<BTreeMap<IssueId, u32>, FetchError> {
    let body = fetcher.fetch(url)?;
    Ok(totals_from_text(&html::visible_text(&body)))
}

fn totals_from_text(text: &str) -> BTreeMap<IssueId, u32> {
    let entry = Regex::new(r"(20\d{5})期.*?(\d+)注").expect("issue-total pattern");
    let mut totals = BTreeMap::new();
    for caps in entry.captures_iter(text) {
        let count: u32 = caps[2].parse().unwrap_or(0);
        *totals.entry(caps[1].to_string()).or_insert(0) += count;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_counts_per_issue_across_region_blocks() {
        let text = "广东 2025088期 3注 上海 2025088期 2注 北京 2025087期 1注";
        let totals = totals_from_text(text);
        assert_eq!(totals.get("2025088"), Some(&5));
        assert_eq!(totals.get("2025087"), Some(&1));
    }

    #[test]
    fn ignores_text_without_issue_ids() {
        assert!(totals_from_text("省市头奖明细（近1000期）").is_empty());
    }
}
