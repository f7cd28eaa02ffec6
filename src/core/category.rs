use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::task::new_id;

/// A named, colored tag that tasks may reference.
///
/// Tasks hold the id only; deleting a category is a store-level cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryItem {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl CategoryItem {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Canonical color for well-known category names, keyed by lowercase name.
pub const PALETTE: &[(&str, &str)] = &[
    ("personal", "#3b82f6"),
    ("work", "#ef4444"),
    ("errands", "#22c55e"),
    ("shopping", "#f59e0b"),
    ("health", "#ec4899"),
    ("ideas", "#8b5cf6"),
];

pub fn palette_color(name: &str) -> Option<&'static str> {
    let key = name.trim().to_lowercase();
    PALETTE
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, color)| *color)
}

/// Categories seeded into a fresh or reset document.
pub fn default_categories() -> Vec<CategoryItem> {
    ["Personal", "Work", "Errands"]
        .into_iter()
        .map(|name| CategoryItem::new(name, palette_color(name).unwrap_or("#6b7280")))
        .collect()
}

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#(?P<tag>[\p{L}\p{N}_-]+)").unwrap()
});

/// Find the first `#tag` in `text` naming one of `categories`.
///
/// Returns the text with that hashtag removed (whitespace collapsed) and the
/// matched category's id. Unknown hashtags are left in place.
pub fn detect_category_tag(text: &str, categories: &[CategoryItem]) -> Option<(String, String)> {
    for caps in HASHTAG_RE.captures_iter(text) {
        let tag = &caps["tag"];
        let Some(category) = categories.iter().find(|c| c.matches_name(tag)) else {
            continue;
        };
        let whole = caps.get(0)?;
        let rest = &text[whole.end()..];
        let mut stripped = String::with_capacity(text.len());
        stripped.push_str(&text[..whole.start()]);
        // Punctuation right after the tag stays attached to the preceding word.
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            stripped.push(' ');
        }
        stripped.push_str(rest);
        let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        return Some((stripped, category.id.clone()));
    }
    None
}
