// src/chat/window.rs
use std::collections::HashMap;
use std::ops::Range;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::chat::parser::ChatMessage;

/// Height assumed for a message that has not been measured yet.
pub const DEFAULT_ITEM_HEIGHT: f64 = 60.0;
/// Extra items kept above the first visible one.
pub const OVERSCAN_ITEMS: usize = 5;

/// Where to scroll so a target message sits in the middle of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollTarget {
    pub index: usize,
    pub scroll_top: f64,
    pub range: Range<usize>,
}

/// Bookkeeping for a windowed message list: measured heights, the visible
/// slice for a scroll position, and scroll-to-timestamp.
#[derive(Debug, Clone)]
pub struct MessageWindow {
    timestamps: Vec<NaiveDateTime>,
    heights: HashMap<usize, f64>,
}

impl MessageWindow {
    pub fn new(messages: &[ChatMessage]) -> Self {
        Self {
            timestamps: messages.iter().map(|m| m.timestamp).collect(),
            heights: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Records the rendered height of one item.
    pub fn measure(&mut self, index: usize, height: f64) {
        if index < self.len() {
            self.heights.insert(index, height);
        }
    }

    pub fn height(&self, index: usize) -> f64 {
        self.heights.get(&index).copied().unwrap_or(DEFAULT_ITEM_HEIGHT)
    }

    /// Top offset of item `index` (sum of the heights before it).
    pub fn offset_of(&self, index: usize) -> f64 {
        (0..index.min(self.len())).map(|i| self.height(i)).sum()
    }

    pub fn total_height(&self) -> f64 {
        self.offset_of(self.len())
    }

    /// Items to render for `scroll_top`: from a few items above the first one
    /// reaching the scroll position, down to two viewports below it.
    pub fn visible_range(&self, scroll_top: f64, viewport_height: f64) -> Range<usize> {
        let mut start = 0;
        let mut accumulated = 0.0;
        while start < self.len() && accumulated < scroll_top {
            accumulated += self.height(start);
            start += 1;
        }
        let start = start.saturating_sub(OVERSCAN_ITEMS);

        let mut end = start;
        let mut accumulated = self.offset_of(start);
        let limit = scroll_top + viewport_height * 2.0;
        while end < self.len() && accumulated < limit {
            accumulated += self.height(end);
            end += 1;
        }
        start..end
    }

    /// Padding heights `(top, bottom)` standing in for the items outside `range`.
    pub fn spacers(&self, range: &Range<usize>) -> (f64, f64) {
        let top = self.offset_of(range.start);
        let bottom = self.total_height() - self.offset_of(range.end);
        (top, bottom.max(0.0))
    }

    /// Index of the message closest in time to `target`; earliest wins ties.
    pub fn closest_index(&self, target: NaiveDateTime) -> Option<usize> {
        self.timestamps
            .iter()
            .enumerate()
            .min_by_key(|(_, ts)| (**ts - target).num_milliseconds().unsigned_abs())
            .map(|(i, _)| i)
    }

    /// Scroll position that centers the message closest to `target`.
    /// A negative or NaN viewport counts as zero height.
    pub fn scroll_to(&self, timestamp: NaiveDateTime, viewport_height: f64) -> Option<ScrollTarget> {
        let index = self.closest_index(timestamp)?;
        let viewport_height = if viewport_height.is_nan() { 0.0 } else { viewport_height.max(0.0) };
        let item_top = self.offset_of(index);
        let item_height = self.height(index);
        let scroll_top = (item_top - (viewport_height - item_height) / 2.0).max(0.0);

        // Never more items than the log holds, so infinite viewports stay bounded.
        let span = (viewport_height / DEFAULT_ITEM_HEIGHT).min(self.len() as f64);
        let start = index.saturating_sub(span.floor() as usize);
        let end = index
            .saturating_add(span.ceil() as usize)
            .max(index + 1)
            .min(self.len());

        tracing::debug!(
            "Scroll target for {}: index {} at offset {:.1}, scroll_top {:.1}",
            timestamp,
            index,
            item_top,
            scroll_top
        );
        Some(ScrollTarget { index, scroll_top, range: start..end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::parser::{parse_timestamp, MessageKind};

    fn messages(stamps: &[&str]) -> Vec<ChatMessage> {
        stamps
            .iter()
            .map(|s| ChatMessage {
                timestamp: parse_timestamp(s).unwrap(),
                username: "u".to_string(),
                content: String::new(),
                kind: MessageKind::Text,
                quoted_content: None,
                chain_items: Vec::new(),
            })
            .collect()
    }

    fn minute_log(count: usize) -> Vec<ChatMessage> {
        let stamps: Vec<String> = (0..count)
            .map(|i| format!("2024-01-01 {:02}:{:02}:00", i / 60, i % 60))
            .collect();
        let refs: Vec<&str> = stamps.iter().map(String::as_str).collect();
        messages(&refs)
    }

    #[test]
    fn test_closest_index() {
        let window = MessageWindow::new(&messages(&[
            "2024-01-01 10:00:00",
            "2024-01-01 10:10:00",
            "2024-01-01 10:20:00",
        ]));
        let at = |s| window.closest_index(parse_timestamp(s).unwrap());
        assert_eq!(at("2024-01-01 10:12:00"), Some(1));
        assert_eq!(at("2024-01-01 09:00:00"), Some(0));
        assert_eq!(at("2024-01-02 00:00:00"), Some(2));
        // Equidistant: the earlier message wins.
        assert_eq!(at("2024-01-01 10:05:00"), Some(0));
        let empty = MessageWindow::new(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.closest_index(parse_timestamp("2024-01-01 10:00:00").unwrap()), None);
    }

    #[test]
    fn test_visible_range_with_overscan() {
        let window = MessageWindow::new(&minute_log(100));
        // 600px down = 10 items of 60px; back off 5; extend to 600 + 2 * 300.
        assert_eq!(window.visible_range(600.0, 300.0), 5..20);
        assert_eq!(window.visible_range(0.0, 300.0), 0..10);
        assert_eq!(window.visible_range(1_000_000.0, 300.0), 95..100);
    }

    #[test]
    fn test_measured_heights_shift_offsets() {
        let mut window = MessageWindow::new(&minute_log(10));
        window.measure(0, 200.0);
        window.measure(99, 10.0); // out of range, ignored
        assert_eq!(window.offset_of(1), 200.0);
        assert_eq!(window.offset_of(2), 260.0);
        assert_eq!(window.total_height(), 200.0 + 9.0 * 60.0);

        let range = 2..5;
        assert_eq!(window.spacers(&range), (260.0, 5.0 * 60.0));
    }

    #[test]
    fn test_scroll_to_centers_target() {
        let log = minute_log(100);
        let window = MessageWindow::new(&log);
        let target = window
            .scroll_to(parse_timestamp("2024-01-01 00:50:10").unwrap(), 600.0)
            .unwrap();
        assert_eq!(target.index, 50);
        // top 3000, centered in a 600px viewport with a 60px item.
        assert_eq!(target.scroll_top, 3000.0 - 270.0);
        assert_eq!(target.range, 40..60);
        assert!(target.range.contains(&target.index));
    }

    #[test]
    fn test_scroll_to_near_top_clamps() {
        let window = MessageWindow::new(&minute_log(3));
        let target = window
            .scroll_to(parse_timestamp("2024-01-01 00:00:00").unwrap(), 600.0)
            .unwrap();
        assert_eq!(target.index, 0);
        assert_eq!(target.scroll_top, 0.0);
        assert_eq!(target.range, 0..3);
    }

    #[test]
    fn test_scroll_to_unbounded_viewport() {
        let window = MessageWindow::new(&minute_log(2));
        let at = parse_timestamp("2024-01-01 00:01:00").unwrap();

        let target = window.scroll_to(at, f64::INFINITY).unwrap();
        assert_eq!(target.index, 1);
        assert_eq!(target.scroll_top, 0.0);
        assert_eq!(target.range, 0..2);

        let target = window.scroll_to(at, f64::NAN).unwrap();
        assert_eq!(target.range, 1..2);
        assert_eq!(target.scroll_top, 90.0);

        let target = window.scroll_to(at, -300.0).unwrap();
        assert_eq!(target.range, 1..2);
    }
}
