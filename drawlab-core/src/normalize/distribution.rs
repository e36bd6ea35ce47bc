//! Distribution normalizer — free-text region lists to a region → count map.

use std::collections::BTreeMap;

use regex::Regex;

/// Parse a free-text list of "region + count" mentions.
///
/// The text is split on runs of common list separators (comma variants,
/// enumeration comma, semicolon, whitespace); each segment must look like
/// CJK region name, integer, then the 注 count unit. Segments that do not
/// match are narrative text and are skipped. A region mentioned more than
/// once has its counts summed, not overwritten.
pub fn parse_regions(text: &str) -> BTreeMap<String, u32> {
    let mut out = BTreeMap::new();
    let trimmed = text.trim().trim_matches(|c| c == '。' || c == ' ');
    if trimmed.is_empty() {
        return out;
    }

    let separators = Regex::new(r"[，,；;、\s]+").expect("separator pattern");
    let entry = Regex::new(r"([\x{4e00}-\x{9fa5}·]+)\s*(\d+)\s*注").expect("region-count pattern");

    for segment in separators.split(trimmed) {
        if let Some(caps) = entry.captures(segment) {
            let region = caps[1].to_string();
            let count: u32 = caps[2].parse().unwrap_or(0);
            *out.entry(region).or_insert(0) += count;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn repeated_region_counts_are_summed() {
        let parsed = parse_regions("广东3注，上海2注，广东1注");
        assert_eq!(parsed, map(&[("广东", 4), ("上海", 2)]));
        assert_eq!(parsed.values().copied().max(), Some(4));
    }

    #[test]
    fn mixed_separators() {
        let parsed = parse_regions("北京1注；浙江2注、四川1注 江苏3注");
        assert_eq!(
            parsed,
            map(&[("北京", 1), ("浙江", 2), ("四川", 1), ("江苏", 3)])
        );
    }

    #[test]
    fn narrative_segments_are_skipped() {
        let parsed = parse_regions("本期一等奖中奖地：山东5注，详情见开奖公告。");
        assert_eq!(parsed, map(&[("山东", 5)]));
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(parse_regions("").is_empty());
        assert!(parse_regions("。 ").is_empty());
        assert!(parse_regions("无").is_empty());
    }

    #[test]
    fn region_names_may_contain_middle_dot() {
        let parsed = parse_regions("新疆·乌鲁木齐1注");
        assert_eq!(parsed, map(&[("新疆·乌鲁木齐", 1)]));
    }
}
