//! Shipped source specs.
//!
//! Pattern fallback lists are ordered: earlier patterns are the layouts the
//! sites currently serve, later ones cover historical variants. All fields
//! capture in group 1.

use std::sync::Arc;

use crate::fetch::PageFetcher;
use crate::sources::pattern::{PatternSource, SourceKind, SourceSpec};
use crate::sources::DrawSource;

fn strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

/// 一起彩 — per-issue detail pages; the primary source for numbers, dates,
/// and the first-tier region list.
pub fn yiqicai() -> SourceSpec {
    SourceSpec {
        name: "yiqicai",
        kind: SourceKind::DetailPage,
        list_url: "https://www.yiqicai.com/kj/ssqkj/".into(),
        detail_url: "https://www.yiqicai.com/kj/ssqkj/ssq_{issue}.html".into(),
        issue_pattern: r"(20\d{5})\s*期".into(),
        date_patterns: strings(&[
            r"{issue}\s*期\s*\[(\d{4}-\d{2}-\d{2})\]",
            r"\[(\d{4}-\d{2}-\d{2})\]",
        ]),
        sales_patterns: strings(&[r"(?:本期全国销量|本期销量)[:：]\s*([0-9\.,万亿]+)"]),
        pool_patterns: strings(&[r"(?:累计奖池|奖池金额)[:：]\s*([0-9\.,万亿]+)"]),
        count_patterns: strings(&[
            r"一等奖\s*[（(]?\s*6\+1[)）]?\s*([0-9]+)",
            r"一等奖\s*([0-9]+)\s*注",
        ]),
        region_patterns: strings(&[
            r"(?s)一等奖中奖明细[:：]\s*(.*?)\s*(?:彩种工具箱|$)",
            r"(?:一等奖中奖地|中奖地区|中奖地)[:：]\s*(.*?)\s*(?:，|。|\s|$)",
        ]),
    }
}

/// 17500 — single listing page with the recent issues; page-level money and
/// the "本期一等奖中奖地" line describe only the most recent issue.
pub fn cn17500() -> SourceSpec {
    SourceSpec {
        name: "17500",
        kind: SourceKind::ListingPage,
        list_url: "https://www.17500.cn/kj/list-ssq.html".into(),
        detail_url: "https://www.17500.cn/kj/list-ssq.html".into(),
        issue_pattern: r"(20\d{5})".into(),
        date_patterns: strings(&[r"(\d{4}-\d{2}-\d{2})"]),
        sales_patterns: strings(&[r"投注总额[:：]\s*([0-9\.,亿万]+)"]),
        pool_patterns: strings(&[r"奖池金额[:：]\s*([0-9\.,亿万]+)"]),
        count_patterns: strings(&[r"共\s*([0-9]+)\s*注"]),
        region_patterns: strings(&[r"本期一等奖中奖地[:：]\s*(.*?)\s*按年份查看"]),
    }
}

/// 中彩网 — official listing page; the authoritative page-level money
/// figures for the most recent issue. Lists no region text.
pub fn zhcw() -> SourceSpec {
    SourceSpec {
        name: "zhcw",
        kind: SourceKind::ListingPage,
        list_url: "https://www.zhcw.com/kjxx/ssq/".into(),
        detail_url: "https://www.zhcw.com/kjxx/ssq/".into(),
        issue_pattern: r"(20\d{5})".into(),
        date_patterns: strings(&[r"(\d{4}-\d{2}-\d{2})"]),
        sales_patterns: strings(&[r"总销售额\s*（?元）?[:：]\s*([0-9\.,亿万]+)"]),
        pool_patterns: strings(&[
            r"奖池金额[:：]\s*([0-9\.,亿万]+)",
            r"奖池（?元）?[:：]\s*([0-9\.,亿万]+)",
        ]),
        count_patterns: strings(&[r"一等奖\s*([0-9]+)\s*注"]),
        region_patterns: strings(&[]),
    }
}

/// All shipped sources, in listing-preference order.
pub fn default_sources(fetcher: Arc<dyn PageFetcher>) -> Vec<Box<dyn DrawSource>> {
    vec![
        Box::new(PatternSource::new(yiqicai(), fetcher.clone())),
        Box::new(PatternSource::new(cn17500(), fetcher.clone())),
        Box::new(PatternSource::new(zhcw(), fetcher)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_url_substitutes_issue() {
        assert_eq!(
            yiqicai().detail_url_for("2025088"),
            "https://www.yiqicai.com/kj/ssqkj/ssq_2025088.html"
        );
    }

    #[test]
    fn listing_sources_reuse_their_list_url() {
        let spec = cn17500();
        assert_eq!(spec.detail_url_for("2025088"), spec.list_url);
        let spec = zhcw();
        assert_eq!(spec.detail_url_for("2025088"), spec.list_url);
    }

    #[test]
    fn all_patterns_compile() {
        for spec in [yiqicai(), cn17500(), zhcw()] {
            let _ = regex::Regex::new(&spec.issue_pattern).unwrap();
            for pattern in spec
                .date_patterns
                .iter()
                .chain(&spec.sales_patterns)
                .chain(&spec.pool_patterns)
                .chain(&spec.count_patterns)
                .chain(&spec.region_patterns)
            {
                let substituted = pattern.replace("{issue}", "2025088");
                let _ = regex::Regex::new(&substituted).unwrap();
            }
        }
    }
}
