// src/extractors/fields.rs
//
// Label scanning inside a section body. Labels are written `标签:` or `标签：`;
// both colon widths are accepted everywhere.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static LIST_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,，、\s]+").expect("Failed to compile LIST_SEPARATOR_RE")
});

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+").expect("Failed to compile DIGITS_RE")
});

// --- Label ---
/// A field label such as `讨论主题：`, with optional alternate spellings.
#[derive(Debug)]
pub struct Label {
    pattern: Regex,
    /// Occurrences directly preceded by one of these are part of a longer
    /// label (`讨论主题` contains `主题`) and are skipped.
    reject_after: &'static [&'static str],
}

impl Label {
    pub fn new(names: &[&str]) -> Self {
        Self::with_rejected_prefixes(names, &[])
    }

    pub fn with_rejected_prefixes(names: &[&str], reject_after: &'static [&'static str]) -> Self {
        let alternatives = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?:{alternatives})[:：]"))
            .expect("Failed to compile label regex");
        Self { pattern, reject_after }
    }

    /// Byte span `(start, end)` of the first accepted occurrence at or after `from`.
    /// `end` is just past the colon.
    pub fn find_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let mut cursor = from;
        while let Some(m) = self.pattern.find_at(text, cursor) {
            if !self.is_rejected(text, m.start()) {
                return Some((m.start(), m.end()));
            }
            cursor = m.end();
        }
        None
    }

    /// Start offsets of every accepted occurrence.
    pub fn starts(&self, text: &str) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut cursor = 0;
        while let Some((start, end)) = self.find_from(text, cursor) {
            starts.push(start);
            cursor = end;
        }
        starts
    }

    fn is_rejected(&self, text: &str, start: usize) -> bool {
        let before = &text[..start];
        self.reject_after.iter().any(|prefix| before.ends_with(prefix))
    }
}

// --- Record Splitting ---
/// Splits `body` into record blocks, each starting at an occurrence of
/// `leading` and running up to the next one (or the end of the body).
/// Anything before the first leading label is discarded.
pub fn split_records<'t>(body: &'t str, leading: &Label) -> Vec<&'t str> {
    let starts = leading.starts(body);
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(body.len());
            &body[start..end]
        })
        .collect()
}

// --- Field Values ---
/// Trimmed text after `label`, up to the earliest following `stops` label or
/// the end of the block.
pub fn value_until<'t>(block: &'t str, label: &Label, stops: &[&Label]) -> Option<&'t str> {
    let (_, value_start) = label.find_from(block, 0)?;
    let value_end = stops
        .iter()
        .filter_map(|stop| stop.find_from(block, value_start).map(|(start, _)| start))
        .min()
        .unwrap_or(block.len());
    Some(block[value_start..value_end].trim())
}

/// The whitespace-delimited token right after `label`. Leading spaces after
/// the colon are skipped, but the token never crosses a line break.
pub fn token_after<'t>(block: &'t str, label: &Label) -> Option<&'t str> {
    let (_, value_start) = label.find_from(block, 0)?;
    let rest = &block[value_start..];
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() && c != '\n');
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(&rest[..token_end])
}

/// Leading digit run right after `label` (allowing spaces after the colon).
pub fn count_after(block: &str, label: &Label) -> Option<u32> {
    let (_, value_start) = label.find_from(block, 0)?;
    let rest = block[value_start..].trim_start_matches(|c: char| c == ' ' || c == '\t');
    leading_number(rest)
}

/// Integer made of the digits at the very start of `text`, like `parseInt`.
pub fn leading_number(text: &str) -> Option<u32> {
    let digits_end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..digits_end].parse().ok()
}

/// First run of ASCII digits anywhere in `text`.
pub fn first_number(text: &str) -> Option<u32> {
    DIGITS_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

// --- List Values ---
/// Splits a keyword/participant list on commas (both widths), `、` and whitespace.
pub fn split_list(text: &str) -> Vec<String> {
    LIST_SEPARATOR_RE
        .split(text)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_accepts_both_colon_widths() {
        let label = Label::new(&["日期"]);
        assert_eq!(token_after("日期:2024-01-01", &label), Some("2024-01-01"));
        assert_eq!(token_after("日期：2024-01-02 extra", &label), Some("2024-01-02"));
        assert_eq!(token_after("日期 2024", &label), None);
    }

    #[test]
    fn test_token_after_skips_spaces_but_not_newlines() {
        let label = Label::new(&["活跃用户"]);
        assert_eq!(token_after("活跃用户：  12\n", &label), Some("12"));
        assert_eq!(token_after("活跃用户：\n12", &label), Some(""));
    }

    #[test]
    fn test_rejected_prefix_skips_longer_label() {
        let label = Label::with_rejected_prefixes(&["主题"], &["讨论"]);
        let text = "讨论主题：A\n主题：B";
        let (start, _) = label.find_from(text, 0).unwrap();
        assert_eq!(&text[start..], "主题：B");
        assert_eq!(label.starts(text).len(), 1);
    }

    #[test]
    fn test_alternate_spellings() {
        let label = Label::new(&["讨论主题", "讨论主体"]);
        assert_eq!(label.starts("讨论主题：a 讨论主体:b").len(), 2);
    }

    #[test]
    fn test_split_records_by_leading_label() {
        let label = Label::new(&["金句"]);
        let body = "preamble\n金句：一\n金句来源：甲\n金句:二\n金句来源：乙\n";
        let blocks = split_records(body, &label);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("金句：一"));
        assert!(blocks[0].contains("甲"));
        assert!(!blocks[0].contains("二"));
        assert!(blocks[1].ends_with("乙\n"));
    }

    #[test]
    fn test_value_until_stops_at_earliest_label() {
        let label = Label::new(&["关键词"]);
        let participants = Label::new(&["参与讨论者"]);
        let count = Label::new(&["消息数量"]);
        let block = "关键词：A、B\n消息数量：3\n参与讨论者：X";
        assert_eq!(value_until(block, &label, &[&participants, &count]), Some("A、B"));
        assert_eq!(value_until("关键词：tail", &label, &[&count]), Some("tail"));
        assert_eq!(value_until("nothing", &label, &[]), None);
    }

    #[test]
    fn test_split_list_mixed_separators() {
        assert_eq!(split_list("A、B, C  D"), vec!["A", "B", "C", "D"]);
        assert_eq!(split_list("甲，乙,,\n丙"), vec!["甲", "乙", "丙"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_numbers() {
        let label = Label::new(&["消息数量"]);
        assert_eq!(count_after("消息数量：45条", &label), Some(45));
        assert_eq!(count_after("消息数量： 7", &label), Some(7));
        assert_eq!(count_after("消息数量：约45", &label), None);
        assert_eq!(leading_number("45%"), Some(45));
        assert_eq!(leading_number("x45"), None);
        assert_eq!(first_number("共 87 条"), Some(87));
        assert_eq!(first_number("无"), None);
        // Full-width digits are not counts.
        assert_eq!(first_number("８７条 共12"), Some(12));
    }
}
