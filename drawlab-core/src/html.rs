//! HTML flattening — reduce a page to its visible text before matching.
//!
//! The sources interleave the interesting figures with markup that changes
//! between historical layout variants; all field patterns therefore run
//! against space-joined visible text, not raw HTML.

use scraper::Html;

/// Visible text of an HTML document with all whitespace runs collapsed to
/// single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
