// src/extractors/models.rs
use serde::{Deserialize, Serialize};

/// Title used when the report carries neither `<document name>` nor `<title>`.
pub const DEFAULT_DOCUMENT_NAME: &str = "未命名文档";

/// Structured form of one digest report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub name: String,
    pub summary: String,
    pub basic_info: BasicInfo,
    pub discussions: Vec<Discussion>,
    pub tutorials: Vec<Tutorial>,
    pub quotes: Vec<Quote>,
    pub data_visualization: DataVisualization,
    pub talkative_ranking: Vec<RankEntry>,
}

impl Default for ParsedDocument {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOCUMENT_NAME.to_string(),
            summary: String::new(),
            basic_info: BasicInfo::default(),
            discussions: Vec::new(),
            tutorials: Vec::new(),
            quotes: Vec::new(),
            data_visualization: DataVisualization::default(),
            talkative_ranking: Vec::new(),
        }
    }
}

impl ParsedDocument {
    /// True when nothing beyond the defaults was recovered from the input.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Header facts, kept verbatim. The generator writes things like "未知" here,
/// so none of these are parsed to numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub date: String,
    pub message_count: String,
    pub active_users: String,
}

impl BasicInfo {
    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.message_count.is_empty() && self.active_users.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub topic: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub participants: Vec<String>,
    pub message_count: u32,
    pub heat_level: HeatLevel,
}

/// Three-tier popularity derived from a discussion's message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeatLevel {
    #[serde(rename = "热门")]
    Trending,
    #[serde(rename = "高热")]
    Hot,
    #[serde(rename = "热议")]
    Discussed,
}

impl HeatLevel {
    pub fn from_message_count(count: u32) -> Self {
        if count > 40 {
            HeatLevel::Trending
        } else if count > 30 {
            HeatLevel::Hot
        } else {
            HeatLevel::Discussed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatLevel::Trending => "热门",
            HeatLevel::Hot => "高热",
            HeatLevel::Discussed => "热议",
        }
    }
}

impl std::fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub title: String,
    pub shared_by: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVisualization {
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_distribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub name: String,
    pub message_count: u32,
}
