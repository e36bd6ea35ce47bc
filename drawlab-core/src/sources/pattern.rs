//! Pattern-driven source adapter.
//!
//! A `SourceSpec` holds everything that differs between sources: URLs, the
//! issue-id shape, and an ordered fallback list of patterns per field. The
//! fallback lists are tried strictly in order; the first match wins, which
//! keeps the matching policy inspectable and testable per field.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use regex::Regex;

use crate::fetch::{FetchError, PageFetcher};
use crate::html;
use crate::normalize::{money_to_yuan, parse_regions};
use crate::record::{IssueId, PartialDrawRecord, RED_COUNT};
use crate::sources::DrawSource;

/// How a source lays out its draw data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One page per issue; `detail_url` contains an `{issue}` placeholder.
    DetailPage,
    /// All recent issues on the listing page itself; fields for one issue
    /// are matched inside a window anchored at that issue's row.
    ListingPage,
}

/// Per-source configuration: URLs plus ordered fallback pattern lists.
///
/// Patterns are plain strings (an `{issue}` placeholder is substituted
/// before compiling); each captures its field in group 1.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub name: &'static str,
    pub kind: SourceKind,
    pub list_url: String,
    /// Issue page URL; equals `list_url` for listing-page sources.
    pub detail_url: String,
    /// Listing-page issue-id pattern, id in group 1.
    pub issue_pattern: String,
    pub date_patterns: Vec<String>,
    pub sales_patterns: Vec<String>,
    pub pool_patterns: Vec<String>,
    pub count_patterns: Vec<String>,
    pub region_patterns: Vec<String>,
}

impl SourceSpec {
    pub fn detail_url_for(&self, issue: &str) -> String {
        self.detail_url.replace("{issue}", issue)
    }
}

/// The one concrete adapter; all per-source behavior lives in the spec.
pub struct PatternSource {
    spec: SourceSpec,
    fetcher: Arc<dyn PageFetcher>,
    /// Last flattened page, so listing-page sources parse N issues from one
    /// fetch instead of re-requesting the same URL N times.
    page_memo: Mutex<Option<(String, String)>>,
}

impl PatternSource {
    pub fn new(spec: SourceSpec, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            spec,
            fetcher,
            page_memo: Mutex::new(None),
        }
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    fn page_text(&self, url: &str) -> Result<String, FetchError> {
        if let Some((memo_url, text)) = self.page_memo.lock().unwrap().as_ref() {
            if memo_url == url {
                return Ok(text.clone());
            }
        }
        let body = self.fetcher.fetch(url)?;
        let text = html::visible_text(&body);
        *self.page_memo.lock().unwrap() = Some((url.to_string(), text.clone()));
        Ok(text)
    }
}

impl DrawSource for PatternSource {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn list_recent_issues(&self, limit: usize) -> Result<Vec<IssueId>, FetchError> {
        let text = self.page_text(&self.spec.list_url)?;
        let re = Regex::new(&self.spec.issue_pattern).expect("issue pattern");

        let mut out: Vec<IssueId> = Vec::new();
        for caps in re.captures_iter(&text) {
            if out.len() >= limit {
                break;
            }
            let m = caps.get(1).expect("issue pattern must capture the id");
            if !digit_bounded(&text, m.start()..m.end()) {
                continue;
            }
            let id = m.as_str();
            if out.iter().any(|seen| seen == id) {
                continue;
            }
            out.push(id.to_string());
        }
        Ok(out)
    }

    fn parse_issue(&self, issue: &str) -> Option<PartialDrawRecord> {
        let url = self.spec.detail_url_for(issue);
        // Fetch failures are absorbed here: one unreachable page skips one
        // issue, it never aborts the batch.
        let text = self.page_text(&url).ok()?;

        let (window, page_wide) = match self.spec.kind {
            SourceKind::DetailPage => (text.as_str(), true),
            SourceKind::ListingPage => {
                let (range, is_latest) = listing_window(&text, issue)?;
                (&text[range], is_latest)
            }
        };

        let date_text = first_capture(window, &self.spec.date_patterns, issue)?;
        let draw_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").ok()?;

        // Date tokens carry two-digit fragments of their own ("…-07-31");
        // drop them before locating the number run.
        let date_shape = Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date shape");
        let scrubbed = date_shape.replace_all(window, " ");
        let (reds, blue) = extract_number_run(&scrubbed)?;

        let mut record = PartialDrawRecord::new(issue);
        record.draw_date = Some(draw_date);
        record.reds = Some(reds);
        record.blue = Some(blue);

        // Page-level money/region text on listing pages describes only the
        // most recent issue; older rows get these fields from other sources.
        if page_wide {
            record.sales_yuan =
                first_capture(&text, &self.spec.sales_patterns, issue).and_then(|t| money_to_yuan(&t));
            record.pool_yuan =
                first_capture(&text, &self.spec.pool_patterns, issue).and_then(|t| money_to_yuan(&t));
            record.first_tier_count =
                first_capture(&text, &self.spec.count_patterns, issue).and_then(|t| t.parse().ok());
            if let Some(raw) = first_capture(&text, &self.spec.region_patterns, issue) {
                record.first_tier_regions = parse_regions(&raw);
                record.first_tier_regions_raw = Some(raw);
            }
        }

        Some(record)
    }
}

/// Try each pattern in order, returning the first non-empty group-1 capture.
fn first_capture(text: &str, patterns: &[String], issue: &str) -> Option<String> {
    for pattern in patterns {
        let pattern = pattern.replace("{issue}", issue);
        let re = Regex::new(&pattern).expect("field pattern");
        if let Some(caps) = re.captures(text) {
            if let Some(m) = caps.get(1) {
                let value = m.as_str().trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Locate the 6 primary + 1 bonus numbers as one contiguous run of 7
/// two-digit tokens. Fewer than 7 means the page layout was not recognized.
fn extract_number_run(text: &str) -> Option<([u8; RED_COUNT], u8)> {
    let re = Regex::new(
        r"\b(\d{2})\s+(\d{2})\s+(\d{2})\s+(\d{2})\s+(\d{2})\s+(\d{2})\s+(\d{2})\b",
    )
    .expect("number-run pattern");
    let caps = re.captures(text)?;
    let mut reds = [0u8; RED_COUNT];
    for (i, red) in reds.iter_mut().enumerate() {
        *red = caps[i + 1].parse().ok()?;
    }
    let blue: u8 = caps[RED_COUNT + 1].parse().ok()?;
    Some((reds, blue))
}

/// Slice of `text` from the requested issue id to the next issue id (or the
/// end of the page), plus whether the issue is the page's most recent one.
fn listing_window(text: &str, issue: &str) -> Option<(Range<usize>, bool)> {
    let scan = Regex::new(r"20\d{5}").expect("issue scan pattern");
    let mut first_id: Option<&str> = None;
    let mut start: Option<usize> = None;
    let mut end = text.len();

    for m in scan.find_iter(text) {
        if !digit_bounded(text, m.range()) {
            continue;
        }
        if first_id.is_none() {
            first_id = Some(m.as_str());
        }
        match start {
            None => {
                if m.as_str() == issue {
                    start = Some(m.start());
                }
            }
            Some(s) => {
                if m.start() > s {
                    end = m.start();
                    break;
                }
            }
        }
    }

    let start = start?;
    Some((start..end, first_id == Some(issue)))
}

/// True when the byte range is not embedded in a longer digit run (a plain
/// `\b` cannot be used: CJK ideographs count as word characters, so an id
/// followed by 期 has no word boundary).
fn digit_bounded(text: &str, range: Range<usize>) -> bool {
    let bytes = text.as_bytes();
    let before_ok = range.start == 0 || !bytes[range.start - 1].is_ascii_digit();
    let after_ok = range.end == bytes.len() || !bytes[range.end].is_ascii_digit();
    before_ok && after_ok
}
