// src/render/markdown.rs
use crate::extractors::chart::document_chart;
use crate::extractors::models::{BasicInfo, ParsedDocument};
use crate::render::mermaid;

/// Renders a parsed digest as a Markdown knowledge card.
///
/// Sections with nothing in them are left out entirely. Discussion and
/// tutorial content is emitted as-is, since the generator already writes it
/// as Markdown.
pub fn to_markdown(document: &ParsedDocument) -> String {
    let mut md = format!("# {}\n\n", document.name);

    if !document.summary.is_empty() {
        for line in document.summary.lines() {
            md.push_str(&format!("> {}\n", line));
        }
        md.push('\n');
    }

    if let Some(info_line) = basic_info_line(&document.basic_info) {
        md.push_str(&info_line);
        md.push_str("\n\n");
    }

    if !document.discussions.is_empty() {
        md.push_str("## 🔥 今日讨论热点\n\n");
        for (i, discussion) in document.discussions.iter().enumerate() {
            md.push_str(&format!(
                "### {}. {} `{}` · {} 条消息\n\n",
                i + 1,
                discussion.topic,
                discussion.heat_level,
                discussion.message_count
            ));
            if !discussion.content.is_empty() {
                md.push_str(&discussion.content);
                md.push_str("\n\n");
            }
            if !discussion.keywords.is_empty() {
                let keywords: Vec<String> =
                    discussion.keywords.iter().map(|k| format!("`{}`", k)).collect();
                md.push_str(&format!("**关键词：** {}\n\n", keywords.join(" ")));
            }
            if !discussion.participants.is_empty() {
                md.push_str(&format!("**参与讨论者：** {}\n\n", discussion.participants.join("、")));
            }
        }
    }

    if !document.tutorials.is_empty() {
        md.push_str("## 📚 干货分享\n\n");
        for tutorial in &document.tutorials {
            md.push_str(&format!("### {} `{}`\n\n", tutorial.title, tutorial.category));
            md.push_str(&format!("*分享者：{}*\n\n", tutorial.shared_by));
            if !tutorial.content.is_empty() {
                md.push_str(&tutorial.content);
                md.push_str("\n\n");
            }
        }
    }

    if !document.quotes.is_empty() {
        md.push_str("## 💬 金句\n\n");
        for quote in &document.quotes {
            md.push_str(&format!("> {}\n>\n> —— {}\n\n", quote.text, quote.source));
        }
    }

    if !document.data_visualization.raw.is_empty() {
        md.push_str("## 📊 数据可视化\n\n");
        match document_chart(document).as_deref().and_then(mermaid::pie_chart) {
            Some(pie) => md.push_str(&format!("```mermaid\n{}```\n\n", pie)),
            None => {
                md.push_str(&document.data_visualization.raw);
                md.push_str("\n\n");
            }
        }
    }

    if !document.talkative_ranking.is_empty() {
        md.push_str("## 🏆 话痨榜单\n\n| 排名 | 成员 | 发言数 |\n| --- | --- | --- |\n");
        for (i, entry) in document.talkative_ranking.iter().enumerate() {
            md.push_str(&format!("| {} | {} | {} |\n", i + 1, entry.name, entry.message_count));
        }
        md.push('\n');
    }

    md.trim_end().to_string() + "\n"
}

fn basic_info_line(info: &BasicInfo) -> Option<String> {
    let parts: Vec<String> = [
        ("日期", &info.date),
        ("消息数量", &info.message_count),
        ("活跃用户", &info.active_users),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{}：{}", label, value))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}
