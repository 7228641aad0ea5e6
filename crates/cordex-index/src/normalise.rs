//! Field value normalisation applied at projection time.

/// Reorder one author entry: comma tokens reversed, space-joined, trimmed.
///
/// `"Jones, Bob"` becomes `"Bob Jones"`; an entry without a comma is only
/// trimmed.
pub fn process_author(entry: &str) -> String {
    entry
        .split(',')
        .rev()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a `;`-separated author string into normalised names. Blank entries
/// are dropped.
pub fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split(';')
        .map(process_author)
        .filter(|a| !a.is_empty())
        .collect()
}

/// Split a comma-joined annotation list, dropping empty tokens.
pub fn split_multi_valued(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Year from the first four characters of a publish date, if numeric.
pub fn extract_year(publish_time: &str) -> Option<i64> {
    let prefix: String = publish_time.trim().chars().take(4).collect();
    if prefix.chars().count() < 4 {
        return None;
    }
    prefix.trim().parse().ok()
}
