//! Draw records — the fundamental dataset unit.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source-independent identifier for one draw (7-digit year+sequence code).
pub type IssueId = String;

/// Number of primary ("red") numbers per draw.
pub const RED_COUNT: usize = 6;

/// Valid range for primary numbers.
pub const RED_MIN: u8 = 1;
pub const RED_MAX: u8 = 33;

/// Valid range for the bonus ("blue") number.
pub const BLUE_MIN: u8 = 1;
pub const BLUE_MAX: u8 = 16;

/// One draw as recovered from a single source, before reconciliation.
///
/// Every field is independently optional; one partial is produced per
/// (source, issue) pair and consumed immediately by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialDrawRecord {
    pub issue: IssueId,
    pub draw_date: Option<NaiveDate>,
    /// Primary numbers in printed (draw) order.
    pub reds: Option<[u8; RED_COUNT]>,
    pub blue: Option<u8>,
    /// Sales volume in whole yuan.
    pub sales_yuan: Option<u64>,
    /// Jackpot pool in whole yuan.
    pub pool_yuan: Option<u64>,
    pub first_tier_count: Option<u32>,
    /// Original free text of the first-tier region list, kept verbatim.
    pub first_tier_regions_raw: Option<String>,
    /// Structured region → winner-count map derived from the raw text.
    /// An empty map means the raw text did not parse, not a missing record.
    pub first_tier_regions: BTreeMap<String, u32>,
}

impl PartialDrawRecord {
    pub fn new(issue: impl Into<IssueId>) -> Self {
        Self {
            issue: issue.into(),
            ..Self::default()
        }
    }
}

/// One validated draw, keyed by issue id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub issue: IssueId,
    pub draw_date: NaiveDate,
    /// Primary numbers in printed (draw) order, each in `RED_MIN..=RED_MAX`.
    pub reds: [u8; RED_COUNT],
    /// Bonus number in `BLUE_MIN..=BLUE_MAX`.
    pub blue: u8,
    pub sales_yuan: Option<u64>,
    pub pool_yuan: Option<u64>,
    pub first_tier_count: Option<u32>,
    pub first_tier_regions_raw: Option<String>,
    pub first_tier_regions: BTreeMap<String, u32>,
}

impl DrawRecord {
    /// Largest per-region winner count, or `None` when no region parsed.
    ///
    /// Derived from `first_tier_regions`; there is deliberately no stored
    /// field for this value.
    pub fn max_region_count(&self) -> Option<u32> {
        self.first_tier_regions.values().copied().max()
    }

    /// Promote a merged partial to a full record.
    ///
    /// Fails with the specific defect when the completeness invariant does
    /// not hold: date, all 6 primary numbers, and the bonus number are
    /// required; duplicate or out-of-range numbers are data-quality defects
    /// that discard the record rather than being silently repaired.
    pub fn try_from_partial(partial: PartialDrawRecord) -> Result<Self, RecordDefect> {
        let PartialDrawRecord {
            issue,
            draw_date,
            reds,
            blue,
            sales_yuan,
            pool_yuan,
            first_tier_count,
            first_tier_regions_raw,
            first_tier_regions,
        } = partial;

        if issue.is_empty() {
            return Err(RecordDefect::EmptyIssue);
        }
        let draw_date = draw_date.ok_or_else(|| RecordDefect::MissingDate {
            issue: issue.clone(),
        })?;
        let reds = reds.ok_or_else(|| RecordDefect::MissingNumbers {
            issue: issue.clone(),
        })?;
        let blue = blue.ok_or_else(|| RecordDefect::MissingNumbers {
            issue: issue.clone(),
        })?;

        for (i, &n) in reds.iter().enumerate() {
            if !(RED_MIN..=RED_MAX).contains(&n) {
                return Err(RecordDefect::NumberOutOfRange { issue, number: n });
            }
            if reds[..i].contains(&n) {
                return Err(RecordDefect::DuplicateNumber { issue, number: n });
            }
        }
        if !(BLUE_MIN..=BLUE_MAX).contains(&blue) {
            return Err(RecordDefect::NumberOutOfRange { issue, number: blue });
        }

        Ok(Self {
            issue,
            draw_date,
            reds,
            blue,
            sales_yuan,
            pool_yuan,
            first_tier_count,
            first_tier_regions_raw,
            first_tier_regions,
        })
    }
}

/// Why a merged partial was discarded instead of becoming a `DrawRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("issue id is empty")]
    EmptyIssue,

    #[error("{issue}: draw date missing")]
    MissingDate { issue: IssueId },

    #[error("{issue}: winning numbers incomplete")]
    MissingNumbers { issue: IssueId },

    #[error("{issue}: duplicate number {number} in draw")]
    DuplicateNumber { issue: IssueId, number: u8 },

    #[error("{issue}: number {number} outside its valid range")]
    NumberOutOfRange { issue: IssueId, number: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_partial() -> PartialDrawRecord {
        PartialDrawRecord {
            issue: "2025091".into(),
            draw_date: NaiveDate::from_ymd_opt(2025, 8, 5),
            reds: Some([1, 7, 12, 19, 26, 33]),
            blue: Some(9),
            sales_yuan: Some(350_000_000),
            pool_yuan: Some(1_200_000_000),
            first_tier_count: Some(6),
            first_tier_regions_raw: Some("广东3注，上海2注，广东1注".into()),
            first_tier_regions: [("广东".to_string(), 4), ("上海".to_string(), 2)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn promotes_complete_partial() {
        let record = DrawRecord::try_from_partial(sample_partial()).unwrap();
        assert_eq!(record.issue, "2025091");
        assert_eq!(record.reds, [1, 7, 12, 19, 26, 33]);
        assert_eq!(record.blue, 9);
    }

    #[test]
    fn max_region_count_is_derived() {
        let record = DrawRecord::try_from_partial(sample_partial()).unwrap();
        assert_eq!(record.max_region_count(), Some(4));

        let mut empty = sample_partial();
        empty.first_tier_regions.clear();
        let record = DrawRecord::try_from_partial(empty).unwrap();
        assert_eq!(record.max_region_count(), None);
    }

    #[test]
    fn missing_date_is_a_defect() {
        let mut partial = sample_partial();
        partial.draw_date = None;
        assert_eq!(
            DrawRecord::try_from_partial(partial),
            Err(RecordDefect::MissingDate {
                issue: "2025091".into()
            })
        );
    }

    #[test]
    fn missing_blue_is_a_defect() {
        let mut partial = sample_partial();
        partial.blue = None;
        assert!(matches!(
            DrawRecord::try_from_partial(partial),
            Err(RecordDefect::MissingNumbers { .. })
        ));
    }

    #[test]
    fn duplicate_reds_are_not_silently_deduplicated() {
        let mut partial = sample_partial();
        partial.reds = Some([1, 7, 7, 19, 26, 33]);
        assert_eq!(
            DrawRecord::try_from_partial(partial),
            Err(RecordDefect::DuplicateNumber {
                issue: "2025091".into(),
                number: 7
            })
        );
    }

    #[test]
    fn out_of_range_numbers_rejected() {
        let mut partial = sample_partial();
        partial.reds = Some([1, 7, 12, 19, 26, 34]);
        assert!(matches!(
            DrawRecord::try_from_partial(partial),
            Err(RecordDefect::NumberOutOfRange { number: 34, .. })
        ));

        let mut partial = sample_partial();
        partial.blue = Some(17);
        assert!(matches!(
            DrawRecord::try_from_partial(partial),
            Err(RecordDefect::NumberOutOfRange { number: 17, .. })
        ));
    }

    #[test]
    fn unparsed_distribution_keeps_record() {
        let mut partial = sample_partial();
        partial.first_tier_regions.clear();
        partial.first_tier_regions_raw = Some("详见公告".into());
        let record = DrawRecord::try_from_partial(partial).unwrap();
        assert_eq!(record.first_tier_regions_raw.as_deref(), Some("详见公告"));
        assert!(record.first_tier_regions.is_empty());
    }

    #[test]
    fn record_serialization_roundtrip() {
        let record = DrawRecord::try_from_partial(sample_partial()).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let deser: DrawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deser);
    }
}
