//! Amount normalizer — magnitude-suffixed money text to whole yuan.

use regex::Regex;

/// Convert free money text to a whole-yuan amount.
///
/// Patterns are tried in strict priority order and the first match wins:
/// 1. decimal followed by 亿 (× 10^8, rounded)
/// 2. decimal followed by 万 (× 10^4, rounded)
/// 3. a bare digit run
///
/// Thousands separators are stripped first. Text with no numeric pattern
/// yields `None`.
pub fn money_to_yuan(text: &str) -> Option<u64> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();

    let hundred_million =
        Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*亿").expect("hundred-million pattern");
    if let Some(caps) = hundred_million.captures(cleaned) {
        let value: f64 = caps[1].parse().ok()?;
        return Some((value * 1e8).round() as u64);
    }

    let ten_thousand = Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*万").expect("ten-thousand pattern");
    if let Some(caps) = ten_thousand.captures(cleaned) {
        let value: f64 = caps[1].parse().ok()?;
        return Some((value * 1e4).round() as u64);
    }

    let digit_run = Regex::new(r"([0-9]+)").expect("digit-run pattern");
    digit_run.captures(cleaned).and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_million_scale() {
        assert_eq!(money_to_yuan("1.2亿"), Some(120_000_000));
        assert_eq!(money_to_yuan("奖池金额：12.74亿元"), Some(1_274_000_000));
        assert_eq!(money_to_yuan("3.14159亿"), Some(314_159_000));
    }

    #[test]
    fn ten_thousand_scale() {
        assert_eq!(money_to_yuan("3456万"), Some(34_560_000));
        assert_eq!(money_to_yuan("本期销量：35,086.5万元"), Some(350_865_000));
    }

    #[test]
    fn bare_digits() {
        assert_eq!(money_to_yuan("350865000"), Some(350_865_000));
        assert_eq!(money_to_yuan("1,234,567元"), Some(1_234_567));
    }

    #[test]
    fn hundred_million_wins_over_ten_thousand() {
        // Both suffixes present: the higher magnitude pattern is tried first
        // regardless of position in the text.
        assert_eq!(money_to_yuan("含500万派送，累计1.2亿"), Some(120_000_000));
    }

    #[test]
    fn no_numeric_pattern_is_none() {
        assert_eq!(money_to_yuan(""), None);
        assert_eq!(money_to_yuan("暂无数据"), None);
        assert_eq!(money_to_yuan("  －  "), None);
    }
}
