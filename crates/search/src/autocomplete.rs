use catalog_corpus::{fold_case, Corpus};

/// Shorter queries match nearly every title, so they are not served.
pub const MIN_QUERY_CHARS: usize = 2;

/// Titles containing `prefix` (case-insensitive), in corpus order, at most `limit`.
///
/// Runs on the corpus alone; it does not need the similarity matrix.
#[must_use]
pub fn suggest(corpus: &Corpus, prefix: &str, limit: usize) -> Vec<String> {
    if prefix.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = fold_case(prefix);
    corpus
        .folded_names()
        .iter()
        .zip(corpus.items())
        .filter(|(folded, _)| folded.contains(needle.as_str()))
        .map(|(_, item)| item.name.clone())
        .take(limit)
        .collect()
}
