//! Dataset assembler — validate, dedupe, and order the merged records.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::record::{DrawRecord, IssueId, PartialDrawRecord};

/// A full run produced zero valid records.
///
/// An all-empty result after a complete scrape attempt signals systemic
/// source failure (blocked access, layout change across the board), not a
/// legitimate "no draws" outcome, so it fails loudly instead of producing an
/// empty table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no valid draw records recovered out of {requested} requested issue(s) — the sources are likely blocking access or changed layout")]
pub struct EmptyResultError {
    pub requested: usize,
}

/// Turn merged partials into the final ordered record sequence.
///
/// Incomplete partials are discarded with a warning; duplicate issue ids
/// keep the last merged record and log the anomaly; output is ascending by
/// issue id.
pub fn assemble(
    partials: Vec<PartialDrawRecord>,
    requested: usize,
    warnings: &mut Vec<String>,
) -> Result<Vec<DrawRecord>, EmptyResultError> {
    let mut by_issue: BTreeMap<IssueId, DrawRecord> = BTreeMap::new();

    for partial in partials {
        match DrawRecord::try_from_partial(partial) {
            Ok(record) => {
                let issue = record.issue.clone();
                if by_issue.insert(issue.clone(), record).is_some() {
                    warnings.push(format!("{issue}: duplicate issue id, keeping the last merge"));
                }
            }
            Err(defect) => warnings.push(format!("discarded: {defect}")),
        }
    }

    if by_issue.is_empty() {
        return Err(EmptyResultError { requested });
    }
    // BTreeMap iteration is ascending by key; fixed-width issue ids make
    // lexicographic and numeric order agree.
    Ok(by_issue.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn complete(issue: &str) -> PartialDrawRecord {
        let mut p = PartialDrawRecord::new(issue);
        p.draw_date = NaiveDate::from_ymd_opt(2025, 7, 31);
        p.reds = Some([3, 7, 15, 22, 28, 31]);
        p.blue = Some(12);
        p
    }

    #[test]
    fn output_is_ascending_and_unique_by_issue() {
        let partials = vec![complete("2025090"), complete("2025088"), complete("2025089")];
        let mut warnings = Vec::new();
        let records = assemble(partials, 3, &mut warnings).unwrap();

        let issues: Vec<&str> = records.iter().map(|r| r.issue.as_str()).collect();
        assert_eq!(issues, vec!["2025088", "2025089", "2025090"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn incomplete_records_are_discarded_with_warning() {
        let mut incomplete = complete("2025089");
        incomplete.blue = None;
        let partials = vec![complete("2025088"), incomplete];

        let mut warnings = Vec::new();
        let records = assemble(partials, 2, &mut warnings).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].issue, "2025088");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("discarded:"));
    }

    #[test]
    fn duplicate_issue_keeps_last_and_warns() {
        let mut second = complete("2025088");
        second.sales_yuan = Some(42);
        let partials = vec![complete("2025088"), second];

        let mut warnings = Vec::new();
        let records = assemble(partials, 2, &mut warnings).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sales_yuan, Some(42));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("duplicate issue id"));
    }

    #[test]
    fn zero_survivors_is_a_hard_failure() {
        let mut incomplete = complete("2025088");
        incomplete.reds = None;
        let mut warnings = Vec::new();

        let err = assemble(vec![incomplete], 1, &mut warnings).unwrap_err();
        assert_eq!(err, EmptyResultError { requested: 1 });

        let err = assemble(Vec::new(), 0, &mut warnings).unwrap_err();
        assert_eq!(err.requested, 0);
    }
}
