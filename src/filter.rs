//! Title selection by locale.

use crate::feed::FeedItem;

/// The only locale whose titles are stored.
pub const CANONICAL_LOCALE: &str = "en-US";

/// Texts of every title in [`CANONICAL_LOCALE`], in document order.
///
/// Duplicate texts are kept. Returns an empty list when the item has no
/// title in that locale.
pub fn canonical_titles(item: &FeedItem) -> Vec<&str> {
    item.titles
        .iter()
        .filter(|t| t.lang == CANONICAL_LOCALE)
        .map(|t| t.text.as_str())
        .collect()
}
