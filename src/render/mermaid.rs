// src/render/mermaid.rs
use crate::extractors::chart::ChartSlice;

/// Mermaid `pie` definition for the topic distribution.
/// Double quotes inside labels would end the label early, so they become single quotes.
pub fn pie_chart(slices: &[ChartSlice]) -> Option<String> {
    if slices.is_empty() {
        return None;
    }

    let mut code = String::from("pie\n");
    for slice in slices {
        code.push_str(&format!("  \"{}\" : {}\n", slice.label.replace('"', "'"), slice.count));
    }
    Some(code)
}
