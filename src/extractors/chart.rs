// src/extractors/chart.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extractors::fields;
use crate::extractors::models::ParsedDocument;

static PAIR_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,，]").expect("Failed to compile PAIR_SEPARATOR_RE")
});

static TOPIC_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*话题[:：]").expect("Failed to compile TOPIC_PREFIX_RE")
});

/// One slice of the topic distribution pie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub label: String,
    pub count: u32,
}

/// Parses `label1:count1,label2:count2,...` into chart slices.
///
/// Pairs with an empty label or a count that does not start with digits are
/// skipped. Returns `None` when nothing drawable remains.
pub fn derive_chart(distribution: &str) -> Option<Vec<ChartSlice>> {
    let distribution = TOPIC_PREFIX_RE.replace(distribution, "");

    let slices: Vec<ChartSlice> = PAIR_SEPARATOR_RE
        .split(&distribution)
        .filter_map(parse_pair)
        .collect();

    if slices.is_empty() {
        tracing::debug!("No chart pairs in topic distribution {:?}", distribution);
        return None;
    }
    Some(slices)
}

/// Chart data for a parsed document, if its visualization section has any.
pub fn document_chart(document: &ParsedDocument) -> Option<Vec<ChartSlice>> {
    document
        .data_visualization
        .topic_distribution
        .as_deref()
        .and_then(derive_chart)
}

fn parse_pair(pair: &str) -> Option<ChartSlice> {
    let mut parts = pair.split([':', '：']);
    let label = parts.next()?.trim();
    let count = fields::leading_number(parts.next()?.trim())?;

    if label.is_empty() {
        return None;
    }
    Some(ChartSlice {
        label: label.to_string(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(label: &str, count: u32) -> ChartSlice {
        ChartSlice { label: label.to_string(), count }
    }

    #[test]
    fn test_derive_with_topic_prefix() {
        assert_eq!(
            derive_chart("话题:AI应用:45,技术讨论:30"),
            Some(vec![slice("AI应用", 45), slice("技术讨论", 30)])
        );
    }

    #[test]
    fn test_derive_full_width_separators() {
        assert_eq!(
            derive_chart("产品：40，运营： 35%，杂谈:25"),
            Some(vec![slice("产品", 40), slice("运营", 35), slice("杂谈", 25)])
        );
    }

    #[test]
    fn test_invalid_pairs_are_filtered() {
        assert_eq!(
            derive_chart(":10,标签:abc,有效:5,只有标签"),
            Some(vec![slice("有效", 5)])
        );
    }

    #[test]
    fn test_nothing_to_draw() {
        assert_eq!(derive_chart("garbage"), None);
        assert_eq!(derive_chart(""), None);
        assert_eq!(derive_chart("话题："), None);
    }

    #[test]
    fn test_document_chart_without_distribution() {
        assert_eq!(document_chart(&ParsedDocument::default()), None);
    }
}
