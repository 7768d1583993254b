// src/extractors/document.rs

// --- Imports ---
use once_cell::sync::Lazy;

use crate::extractors::fallback::{Fallbacks, FixedFallbacks};
use crate::extractors::fields::{self, Label};
use crate::extractors::models::{
    BasicInfo, DataVisualization, Discussion, HeatLevel, ParsedDocument, Quote, RankEntry,
    Tutorial, DEFAULT_DOCUMENT_NAME,
};
use crate::extractors::tags::{self, SectionTag};

// --- Labels (Lazy Static) ---
struct Labels {
    date: Label,
    message_count: Label,
    active_users: Label,
    discussion_topic: Label,
    discussion_content: Label,
    keywords: Label,
    participants: Label,
    tutorial_title: Label,
    shared_by: Label,
    tutorial_content: Label,
    quote_text: Label,
    quote_source: Label,
    topic_distribution: Label,
}

static LABELS: Lazy<Labels> = Lazy::new(|| Labels {
    date: Label::new(&["日期"]),
    message_count: Label::new(&["消息数量"]),
    active_users: Label::new(&["活跃用户"]),
    // `讨论主体` is a misspelling some generated reports use for the topic label.
    discussion_topic: Label::new(&["讨论主题", "讨论主体"]),
    discussion_content: Label::with_rejected_prefixes(&["内容"], &["详细"]),
    keywords: Label::new(&["关键词"]),
    participants: Label::new(&["参与讨论者"]),
    tutorial_title: Label::with_rejected_prefixes(&["主题"], &["讨论"]),
    shared_by: Label::new(&["分享者"]),
    tutorial_content: Label::new(&["详细内容"]),
    quote_text: Label::new(&["金句"]),
    quote_source: Label::new(&["金句来源"]),
    topic_distribution: Label::new(&["话题"]),
});

const NAME_TAGS: [SectionTag; 2] = [SectionTag::DocumentName, SectionTag::Title];

// --- Entry Points ---
/// Parses a digest report with [`FixedFallbacks`]. Never fails: absent or
/// malformed sections come back as their defaults.
pub fn parse(raw: &str) -> ParsedDocument {
    parse_with(raw, &mut FixedFallbacks::default())
}

/// Parses a digest report, taking values for omitted fields from `fallbacks`.
pub fn parse_with(raw: &str, fallbacks: &mut dyn Fallbacks) -> ParsedDocument {
    DocumentExtractor::new().extract(raw, fallbacks)
}

// --- Main Extractor Structure ---
/// Section-by-section extractor. Each section is located independently, so the
/// order of sections in the input does not matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self {}
    }

    pub fn extract(&self, raw: &str, fallbacks: &mut dyn Fallbacks) -> ParsedDocument {
        let document = ParsedDocument {
            name: self.extract_name(raw),
            summary: self.extract_summary(raw),
            basic_info: self.extract_basic_info(raw),
            discussions: self.extract_discussions(raw, fallbacks),
            tutorials: self.extract_tutorials(raw, fallbacks),
            quotes: self.extract_quotes(raw),
            data_visualization: self.extract_data_visualization(raw),
            talkative_ranking: self.extract_ranking(raw),
        };

        tracing::debug!(
            "Parsed '{}': {} discussions, {} tutorials, {} quotes, {} ranking entries",
            document.name,
            document.discussions.len(),
            document.tutorials.len(),
            document.quotes.len(),
            document.talkative_ranking.len()
        );
        document
    }

    fn extract_name(&self, raw: &str) -> String {
        tags::first_section(raw, &NAME_TAGS)
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string())
    }

    fn extract_summary(&self, raw: &str) -> String {
        tags::section(raw, SectionTag::Summary)
            .map(|summary| summary.trim().to_string())
            .unwrap_or_default()
    }

    fn extract_basic_info(&self, raw: &str) -> BasicInfo {
        let Some(body) = tags::section(raw, SectionTag::BasicInfo) else {
            return BasicInfo::default();
        };
        let l = &*LABELS;
        let token = |label: &Label| fields::token_after(body, label).unwrap_or("").to_string();

        BasicInfo {
            date: token(&l.date),
            message_count: token(&l.message_count),
            active_users: token(&l.active_users),
        }
    }

    fn extract_discussions(&self, raw: &str, fallbacks: &mut dyn Fallbacks) -> Vec<Discussion> {
        let Some(body) = tags::section(raw, SectionTag::HotDiscussions) else {
            return Vec::new();
        };
        let l = &*LABELS;

        fields::split_records(body, &l.discussion_topic)
            .into_iter()
            .filter_map(|block| self.parse_discussion(block, fallbacks))
            .collect()
    }

    fn parse_discussion(&self, block: &str, fallbacks: &mut dyn Fallbacks) -> Option<Discussion> {
        let l = &*LABELS;
        // Each field runs until whichever later field label comes first.
        let topic = fields::value_until(
            block,
            &l.discussion_topic,
            &[&l.discussion_content, &l.keywords, &l.participants, &l.message_count],
        )?;
        let content = fields::value_until(
            block,
            &l.discussion_content,
            &[&l.keywords, &l.participants, &l.message_count],
        )
        .unwrap_or("");
        let keywords =
            fields::value_until(block, &l.keywords, &[&l.participants, &l.message_count]).unwrap_or("");
        let participants =
            fields::value_until(block, &l.participants, &[&l.message_count]).unwrap_or("");

        let message_count = match fields::count_after(block, &l.message_count) {
            Some(count) => count,
            None => {
                let count = fallbacks.message_count();
                tracing::trace!("Discussion '{}' has no message count, using {}", topic, count);
                count
            }
        };

        Some(Discussion {
            topic: topic.to_string(),
            content: content.to_string(),
            keywords: fields::split_list(keywords),
            participants: fields::split_list(participants),
            message_count,
            heat_level: HeatLevel::from_message_count(message_count),
        })
    }

    fn extract_tutorials(&self, raw: &str, fallbacks: &mut dyn Fallbacks) -> Vec<Tutorial> {
        let Some(body) = tags::section(raw, SectionTag::Tutorials) else {
            return Vec::new();
        };
        let l = &*LABELS;

        let mut tutorials = Vec::new();
        for block in fields::split_records(body, &l.tutorial_title) {
            // All three labels must appear, in order.
            let Some((_, title_start)) = l.tutorial_title.find_from(block, 0) else {
                continue;
            };
            let Some((shared_at, shared_start)) = l.shared_by.find_from(block, title_start) else {
                tracing::trace!("Dropping tutorial block without 分享者: {:?}", block.trim());
                continue;
            };
            let Some((content_at, content_start)) = l.tutorial_content.find_from(block, shared_start)
            else {
                tracing::trace!("Dropping tutorial block without 详细内容: {:?}", block.trim());
                continue;
            };

            tutorials.push(Tutorial {
                title: block[title_start..shared_at].trim().to_string(),
                shared_by: block[shared_start..content_at].trim().to_string(),
                content: block[content_start..].trim().to_string(),
                category: fallbacks.category(),
            });
        }
        tutorials
    }

    fn extract_quotes(&self, raw: &str) -> Vec<Quote> {
        let Some(body) = tags::section(raw, SectionTag::Quotes) else {
            return Vec::new();
        };
        let l = &*LABELS;

        let mut quotes = Vec::new();
        for block in fields::split_records(body, &l.quote_text) {
            let Some((_, text_start)) = l.quote_text.find_from(block, 0) else {
                continue;
            };
            let Some((source_at, source_start)) = l.quote_source.find_from(block, text_start) else {
                tracing::trace!("Dropping quote block without 金句来源: {:?}", block.trim());
                continue;
            };

            quotes.push(Quote {
                text: block[text_start..source_at].trim().to_string(),
                source: block[source_start..].trim().to_string(),
            });
        }
        quotes
    }

    fn extract_data_visualization(&self, raw: &str) -> DataVisualization {
        let Some(body) = tags::section(raw, SectionTag::DataVisualization) else {
            return DataVisualization::default();
        };
        let l = &*LABELS;
        let raw_text = body.trim();

        let topic_distribution = l.topic_distribution.find_from(raw_text, 0).map(|(_, start)| {
            let rest = &raw_text[start..];
            let line_end = rest.find('\n').unwrap_or(rest.len());
            rest[..line_end].trim().to_string()
        });

        DataVisualization {
            raw: raw_text.to_string(),
            topic_distribution,
        }
    }

    fn extract_ranking(&self, raw: &str) -> Vec<RankEntry> {
        let Some(body) = tags::section(raw, SectionTag::TalkativeRanking) else {
            return Vec::new();
        };

        body.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let entry = parse_rank_line(line);
                if entry.is_none() {
                    tracing::trace!("Dropping ranking line: {:?}", line.trim());
                }
                entry
            })
            .collect()
    }
}

/// `name：count` with the count taken from the first digit run after the colon.
fn parse_rank_line(line: &str) -> Option<RankEntry> {
    let (name, rest) = line.split_once([':', '：'])?;
    let name = name.trim();
    let message_count = fields::first_number(rest)?;

    if name.is_empty() || message_count == 0 {
        return None;
    }
    Some(RankEntry {
        name: name.to_string(),
        message_count,
    })
}
