//! Fixed-column CSV export and strict re-import.
//!
//! The column order is the dataset contract and never changes. Nullable
//! fields serialize as empty cells; the structured region map serializes as
//! compact JSON. Import validates the header, every field, and that the
//! max-region column agrees with the value derived from the JSON map.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::{DrawRecord, PartialDrawRecord, RED_COUNT};

/// The dataset's fixed column order.
pub const COLUMNS: [&str; 15] = [
    "issue",
    "draw_date",
    "red1",
    "red2",
    "red3",
    "red4",
    "red5",
    "red6",
    "blue",
    "sales_yuan",
    "pool_yuan",
    "first_tier_count",
    "first_tier_regions_raw",
    "first_tier_regions_json",
    "max_region_count",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv writer error: {0}")]
    Writer(String),

    #[error("unexpected csv header (the column order is fixed)")]
    Header,

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
}

fn opt_cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialize records in the fixed column order.
pub fn export_csv(records: &[DrawRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(COLUMNS)?;

    for record in records {
        let regions_json = if record.first_tier_regions.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&record.first_tier_regions)
                .map_err(|e| ExportError::Writer(e.to_string()))?
        };

        let mut row: Vec<String> = Vec::with_capacity(COLUMNS.len());
        row.push(record.issue.clone());
        row.push(record.draw_date.to_string());
        for red in record.reds {
            row.push(red.to_string());
        }
        row.push(record.blue.to_string());
        row.push(opt_cell(record.sales_yuan));
        row.push(opt_cell(record.pool_yuan));
        row.push(opt_cell(record.first_tier_count));
        row.push(record.first_tier_regions_raw.clone().unwrap_or_default());
        row.push(regions_json);
        row.push(opt_cell(record.max_region_count()));
        wtr.write_record(&row)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Writer(e.to_string()))?;
    String::from_utf8(data).map_err(|e| ExportError::Writer(e.to_string()))
}

fn parse_opt<T: FromStr>(cell: &str, row: usize, column: &str) -> Result<Option<T>, ExportError> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse()
        .map(Some)
        .map_err(|_| ExportError::Row {
            row,
            reason: format!("invalid {column}: {cell:?}"),
        })
}

fn parse_req<T: FromStr>(cell: &str, row: usize, column: &str) -> Result<T, ExportError> {
    parse_opt(cell, row, column)?.ok_or_else(|| ExportError::Row {
        row,
        reason: format!("missing required {column}"),
    })
}

/// Parse a dataset written by `export_csv` back into records.
///
/// Rejects a wrong header, any malformed field, and a max-region column that
/// disagrees with the value derived from the JSON map.
pub fn import_csv(data: &str) -> Result<Vec<DrawRecord>, ExportError> {
    let mut rdr = csv::Reader::from_reader(data.as_bytes());
    if rdr.headers()?.iter().ne(COLUMNS) {
        return Err(ExportError::Header);
    }

    let mut out = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let row = index + 2; // 1-based, after the header line
        let cells = result?;
        if cells.len() != COLUMNS.len() {
            return Err(ExportError::Row {
                row,
                reason: format!("expected {} columns, got {}", COLUMNS.len(), cells.len()),
            });
        }
        let cell = |i: usize| cells.get(i).unwrap_or("");

        let draw_date = NaiveDate::parse_from_str(cell(1), "%Y-%m-%d").map_err(|_| {
            ExportError::Row {
                row,
                reason: format!("invalid draw_date: {:?}", cell(1)),
            }
        })?;

        let mut reds = [0u8; RED_COUNT];
        for (i, red) in reds.iter_mut().enumerate() {
            *red = parse_req(cell(2 + i), row, COLUMNS[2 + i])?;
        }

        let regions_json = cell(13);
        let first_tier_regions: BTreeMap<String, u32> = if regions_json.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(regions_json).map_err(|e| ExportError::Row {
                row,
                reason: format!("invalid first_tier_regions_json: {e}"),
            })?
        };

        let raw = cell(12);
        let partial = PartialDrawRecord {
            issue: cell(0).to_string(),
            draw_date: Some(draw_date),
            reds: Some(reds),
            blue: Some(parse_req(cell(8), row, "blue")?),
            sales_yuan: parse_opt(cell(9), row, "sales_yuan")?,
            pool_yuan: parse_opt(cell(10), row, "pool_yuan")?,
            first_tier_count: parse_opt(cell(11), row, "first_tier_count")?,
            first_tier_regions_raw: (!raw.is_empty()).then(|| raw.to_string()),
            first_tier_regions,
        };

        let record = DrawRecord::try_from_partial(partial).map_err(|defect| ExportError::Row {
            row,
            reason: defect.to_string(),
        })?;

        let stored_max: Option<u32> = parse_opt(cell(14), row, "max_region_count")?;
        if stored_max != record.max_region_count() {
            return Err(ExportError::Row {
                row,
                reason: format!(
                    "max_region_count {:?} disagrees with the region map (derived {:?})",
                    stored_max,
                    record.max_region_count()
                ),
            });
        }

        out.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> DrawRecord {
        DrawRecord {
            issue: "2025088".into(),
            draw_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            reds: [3, 7, 15, 22, 28, 31],
            blue: 12,
            sales_yuan: Some(350_865_000),
            pool_yuan: Some(1_274_000_000),
            first_tier_count: Some(5),
            first_tier_regions_raw: Some("广东3注，上海2注".into()),
            first_tier_regions: [("广东".to_string(), 3), ("上海".to_string(), 2)]
                .into_iter()
                .collect(),
        }
    }

    fn sparse_record() -> DrawRecord {
        DrawRecord {
            issue: "2025087".into(),
            draw_date: NaiveDate::from_ymd_opt(2025, 7, 29).unwrap(),
            reds: [1, 5, 9, 13, 17, 21],
            blue: 8,
            sales_yuan: None,
            pool_yuan: None,
            first_tier_count: None,
            first_tier_regions_raw: None,
            first_tier_regions: BTreeMap::new(),
        }
    }

    #[test]
    fn header_is_the_fixed_column_order() {
        let csv = export_csv(&[full_record()]).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(","));
    }

    #[test]
    fn roundtrip_reproduces_records_exactly() {
        let records = vec![sparse_record(), full_record()];
        let csv = export_csv(&records).unwrap();
        let restored = import_csv(&csv).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn nulls_stay_null_through_roundtrip() {
        let csv = export_csv(&[sparse_record()]).unwrap();
        let restored = import_csv(&csv).unwrap();
        assert_eq!(restored[0].sales_yuan, None);
        assert_eq!(restored[0].pool_yuan, None);
        assert_eq!(restored[0].first_tier_count, None);
        assert_eq!(restored[0].first_tier_regions_raw, None);
        assert!(restored[0].first_tier_regions.is_empty());
        assert_eq!(restored[0].max_region_count(), None);
    }

    #[test]
    fn empty_dataset_is_header_only() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn import_rejects_wrong_header() {
        let err = import_csv("issue,nope\n1,2\n").unwrap_err();
        assert!(matches!(err, ExportError::Header));
    }

    #[test]
    fn import_rejects_inconsistent_max_region_count() {
        let mut csv = export_csv(&[full_record()]).unwrap();
        // Tamper with the trailing max_region_count cell: derived value is 3.
        assert!(csv.trim_end().ends_with(",3"));
        csv = csv.trim_end().trim_end_matches(",3").to_string() + ",9\n";

        let err = import_csv(&csv).unwrap_err();
        match err {
            ExportError::Row { reason, .. } => assert!(reason.contains("disagrees")),
            other => panic!("expected row error, got: {other:?}"),
        }
    }

    #[test]
    fn import_rejects_duplicate_numbers() {
        let csv = "issue,draw_date,red1,red2,red3,red4,red5,red6,blue,sales_yuan,pool_yuan,first_tier_count,first_tier_regions_raw,first_tier_regions_json,max_region_count\n\
                   2025088,2025-07-31,3,3,15,22,28,31,12,,,,,,\n";
        let err = import_csv(csv).unwrap_err();
        match err {
            ExportError::Row { reason, .. } => assert!(reason.contains("duplicate number")),
            other => panic!("expected row error, got: {other:?}"),
        }
    }
}
