// src/extractors/tags.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Section Tags ---
/// Top-level sections of a digest report. Tag names are matched literally
/// (including the inner space) and case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SectionTag {
    DocumentName,
    Title,
    Summary,
    BasicInfo,
    HotDiscussions,
    Tutorials,
    Quotes,
    DataVisualization,
    TalkativeRanking,
}

impl SectionTag {
    /// Every tag, in declaration order so `ALL[tag as usize] == tag`.
    pub const ALL: [SectionTag; 9] = [
        SectionTag::DocumentName,
        SectionTag::Title,
        SectionTag::Summary,
        SectionTag::BasicInfo,
        SectionTag::HotDiscussions,
        SectionTag::Tutorials,
        SectionTag::Quotes,
        SectionTag::DataVisualization,
        SectionTag::TalkativeRanking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTag::DocumentName => "document name",
            SectionTag::Title => "title",
            SectionTag::Summary => "summary",
            SectionTag::BasicInfo => "basic info",
            SectionTag::HotDiscussions => "hot discussions",
            SectionTag::Tutorials => "tutorials",
            SectionTag::Quotes => "quotes",
            SectionTag::DataVisualization => "data visualization",
            SectionTag::TalkativeRanking => "talkative ranking",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// --- Regex Patterns (Lazy Static) ---
// One non-greedy `<tag>...</tag>` matcher per section, indexed like `SectionTag::ALL`.
static SECTION_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    SectionTag::ALL
        .iter()
        .map(|tag| {
            let name = regex::escape(tag.as_str());
            Regex::new(&format!(r"(?is)<{name}>(.*?)</{name}>"))
                .expect("Failed to compile section tag regex")
        })
        .collect()
});

/// Body of the first `<tag>...</tag>` region, untrimmed.
pub fn section(text: &str, tag: SectionTag) -> Option<&str> {
    let body = SECTION_RE[tag.index()]
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match body {
        Some(_) => tracing::trace!("Found <{}> section", tag.as_str()),
        None => tracing::trace!("No <{}> section in input", tag.as_str()),
    }
    body
}

/// Body of the first tag in `tags` that is present, tried in order.
/// Used where the generator is known to spell a section more than one way.
pub fn first_section<'t>(text: &'t str, tags: &[SectionTag]) -> Option<&'t str> {
    tags.iter().find_map(|tag| section(text, *tag))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (i, tag) in SectionTag::ALL.iter().enumerate() {
            assert_eq!(tag.index(), i);
            assert!(SECTION_RE[i].as_str().contains(tag.as_str()));
        }
    }

    #[test]
    fn test_section_is_case_insensitive_and_multiline() {
        let text = "intro\n<Hot Discussions>\nline one\nline two\n</HOT DISCUSSIONS>\ntrailer";
        assert_eq!(
            section(text, SectionTag::HotDiscussions),
            Some("\nline one\nline two\n")
        );
    }

    #[test]
    fn test_section_is_non_greedy() {
        let text = "<summary>first</summary> <summary>second</summary>";
        assert_eq!(section(text, SectionTag::Summary), Some("first"));
    }

    #[test]
    fn test_missing_or_unclosed_section() {
        assert_eq!(section("<quotes>never closed", SectionTag::Quotes), None);
        assert_eq!(section("plain text", SectionTag::Summary), None);
    }

    #[test]
    fn test_tag_name_requires_inner_space() {
        assert_eq!(section("<basicinfo>x</basicinfo>", SectionTag::BasicInfo), None);
        assert_eq!(section("<basic info>x</basic info>", SectionTag::BasicInfo), Some("x"));
    }

    #[test]
    fn test_first_section_prefers_earlier_tag() {
        let both = "<title>T</title><document name>D</document name>";
        let tags = [SectionTag::DocumentName, SectionTag::Title];
        assert_eq!(first_section(both, &tags), Some("D"));
        assert_eq!(first_section("<TITLE>T</TITLE>", &tags), Some("T"));
        assert_eq!(first_section("nothing", &tags), None);
    }
}
