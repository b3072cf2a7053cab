//! Keyword filtering and deduplication
// (c) 2024 Ross Younger

use crate::ssh::FilteredEntry;

/// Extracts filter keywords from a list of command-line tokens.
///
/// Flag-shaped tokens (anything starting with `-`) belong to the caller and are dropped,
/// as are empty tokens.
#[must_use]
pub fn keywords_from<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|t| {
            let t = t.as_ref();
            (!t.is_empty() && !t.starts_with('-')).then(|| t.to_string())
        })
        .collect()
}

/// Does this entry match every keyword (case-insensitive substring)?
#[must_use]
pub fn matches_all<S: AsRef<str>>(entry: &FilteredEntry, keywords: &[S]) -> bool {
    let haystack = entry.serialized().to_lowercase();
    keywords
        .iter()
        .all(|k| haystack.contains(&k.as_ref().to_lowercase()))
}

/// Keeps only the entries matching all of the `keywords`, then deduplicates.
///
/// With no keywords, everything passes.
/// The output is sorted by serialized form, so it does not depend on input order.
#[must_use]
pub fn filter<I, S>(entries: I, keywords: &[S]) -> Vec<FilteredEntry>
where
    I: IntoIterator<Item = FilteredEntry>,
    S: AsRef<str>,
{
    let mut keyed: Vec<(String, FilteredEntry)> = entries
        .into_iter()
        .filter(|e| matches_all(e, keywords))
        .map(|e| (e.serialized(), e))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    keyed.into_iter().map(|(_, e)| e).collect()
}
