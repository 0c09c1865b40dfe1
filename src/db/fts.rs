//! Query sanitization for the figure search index.

/// Turn free text into an FTS5 `MATCH` expression.
///
/// Every whitespace-separated word becomes a quoted prefix term, so
/// `iu pal` matches "IU" together with "Palette". Quotes inside words are
/// doubled. Returns an empty string when there is nothing to search for.
#[must_use]
pub fn sanitize_fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| word.replace('"', "\"\""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\"*"))
        .collect::<Vec<_>>()
        .join(" ")
}
