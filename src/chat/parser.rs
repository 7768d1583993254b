// src/chat/parser.rs

// --- Imports ---
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::ChatError;

// --- Regex Patterns (Lazy Static) ---
static MESSAGE_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})\s+(.+)$")
        .expect("Failed to compile MESSAGE_START_RE")
});

static REVOKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<revokemsg>"(.+)" 撤回了一条消息</revokemsg>"#).expect("Failed to compile REVOKE_RE")
});

static QUOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^引用:(.+?)：(.+)$").expect("Failed to compile QUOTE_RE")
});

static CHAIN_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\s*.+").expect("Failed to compile CHAIN_ITEM_RE")
});

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const REVOKED_CONTENT: &str = "撤回了一条消息";

// --- Data Structures ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Quote,
    /// A `#接龙` sign-up chain; numbered follow-up lines become chain items.
    Chain,
    Revoke,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub timestamp: NaiveDateTime,
    pub username: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain_items: Vec<String>,
}

/// Parses `YYYY-MM-DD HH:MM:SS`, tolerating extra spaces between date and time.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ChatError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT)
        .map_err(|_| ChatError::InvalidTimestamp(text.to_string()))
}

/// Parses an exported chat log. Each message starts on a line beginning
/// with a timestamp; following lines without one continue that message.
pub fn parse_chat_log(raw: &str) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::new();

    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        if let Some(caps) = MESSAGE_START_RE.captures(line) {
            let stamp = format!("{} {}", &caps[1], &caps[2]);
            match parse_timestamp(&stamp) {
                Ok(timestamp) => {
                    messages.push(start_message(timestamp, &caps[3]));
                    continue;
                }
                // Looks like a timestamp but is not a real date; keep it as text.
                Err(e) => tracing::debug!("Treating line as continuation: {}", e),
            }
        }

        let Some(current) = messages.last_mut() else {
            tracing::trace!("Skipping line before first message: {:?}", line);
            continue;
        };
        let line = line.trim();
        if current.kind == MessageKind::Chain && CHAIN_ITEM_RE.is_match(line) {
            current.chain_items.push(line.to_string());
        } else if current.content.is_empty() {
            current.content = line.to_string();
        } else {
            current.content.push('\n');
            current.content.push_str(line);
        }
    }

    tracing::debug!("Parsed {} chat messages", messages.len());
    messages
}

fn start_message(timestamp: NaiveDateTime, rest: &str) -> ChatMessage {
    let mut message = ChatMessage {
        timestamp,
        username: String::new(),
        content: String::new(),
        kind: MessageKind::Text,
        quoted_content: None,
        chain_items: Vec::new(),
    };

    if rest.contains("<revokemsg>") {
        message.username = REVOKE_RE
            .captures(rest)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        message.content = REVOKED_CONTENT.to_string();
        message.kind = MessageKind::Revoke;
        return message;
    }

    let Some((username, content)) = rest.split_once(' ') else {
        message.username = rest.to_string();
        return message;
    };
    message.username = username.to_string();
    message.content = content.to_string();

    if content == "[图片]" {
        message.kind = MessageKind::Image;
    } else if content.starts_with("引用:") {
        message.kind = MessageKind::Quote;
        if let Some(caps) = QUOTE_RE.captures(content) {
            message.quoted_content = Some(caps[1].to_string());
            message.content = caps[2].to_string();
        }
    } else if content.contains("#接龙") {
        message.kind = MessageKind::Chain;
    }
    message
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
导出时间 2024-03-15
2024-03-15 09:00:01 张三 早上好
今天讨论什么？

2024-03-15 09:01:10 李四 [图片]
2024-03-15 09:02:00 <revokemsg>\"王五\" 撤回了一条消息</revokemsg>
2024-03-15 09:03:30 赵六 引用:张三：早上好：早！
2024-03-15 09:04:00 张三 #接龙 周末聚餐
1. 张三
2.李四
备注：AA 制
2024-03-15 09:05:00 孤独的名字
";

    #[test]
    fn test_parse_chat_log_kinds() {
        let messages = parse_chat_log(LOG);
        assert_eq!(messages.len(), 6);

        assert_eq!(messages[0].username, "张三");
        assert_eq!(messages[0].content, "早上好\n今天讨论什么？");
        assert_eq!(messages[0].kind, MessageKind::Text);
        assert_eq!(messages[0].timestamp, parse_timestamp("2024-03-15 09:00:01").unwrap());

        assert_eq!(messages[1].kind, MessageKind::Image);

        assert_eq!(messages[2].kind, MessageKind::Revoke);
        assert_eq!(messages[2].username, "王五");
        assert_eq!(messages[2].content, "撤回了一条消息");

        assert_eq!(messages[3].kind, MessageKind::Quote);
        assert_eq!(messages[3].quoted_content.as_deref(), Some("张三"));
        assert_eq!(messages[3].content, "早上好：早！");

        assert_eq!(messages[4].kind, MessageKind::Chain);
        assert_eq!(messages[4].chain_items, vec!["1. 张三", "2.李四"]);
        assert_eq!(messages[4].content, "#接龙 周末聚餐\n备注：AA 制");

        assert_eq!(messages[5].username, "孤独的名字");
        assert_eq!(messages[5].content, "");
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-03-15   09:00:01").is_ok());
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ChatError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_impossible_date_is_continuation() {
        let messages = parse_chat_log("2024-01-01 10:00:00 甲 开始\n2024-13-45 10:00:00 乙 伪造");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "开始\n2024-13-45 10:00:00 乙 伪造");
    }

    #[test]
    fn test_serialized_shape() {
        let messages = parse_chat_log("2024-01-01 10:00:00 甲 [图片]");
        let json = serde_json::to_value(&messages[0]).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["username"], "甲");
        assert!(json.get("chainItems").is_none());
    }
}
