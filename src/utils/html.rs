//! Text helpers over parsed HTML.

use scraper::{ElementRef, Node};

/// Trimmed, non-empty text nodes under `element`, skipping scripts and styles.
pub fn stripped_strings(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let in_code = node
                    .parent()
                    .and_then(ElementRef::wrap)
                    .is_some_and(|parent| matches!(parent.value().name(), "script" | "style"));
                (!in_code).then(|| text.trim())
            }
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stripped text fragments joined with `separator`.
pub fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    stripped_strings(element).join(separator)
}
