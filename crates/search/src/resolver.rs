use crate::error::{Result, SearchError};
use catalog_corpus::{fold_case, Corpus};

/// Maps user text to a single anchor row.
///
/// Case-insensitive literal substring match against item names. When several
/// names match, the lowest row id wins; match quality plays no part.
pub fn resolve(corpus: &Corpus, query: Option<&str>) -> Result<usize> {
    let query = query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| SearchError::NotFound(String::new()))?;

    let needle = fold_case(query);
    let anchor = corpus
        .folded_names()
        .iter()
        .position(|name| name.contains(needle.as_str()))
        .ok_or_else(|| SearchError::NotFound(query.to_string()))?;

    log::debug!("Resolved {query:?} to row {anchor}");
    Ok(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_corpus::FeedRow;

    fn corpus() -> Corpus {
        Corpus::from_rows(
            vec![
                FeedRow::new("Naruto", "Action Adventure"),
                FeedRow::new("Naruto: Shippuden", "Action Adventure"),
                FeedRow::new("Bleach", "Action Adventure"),
            ],
            100,
        )
    }

    #[test]
    fn partial_case_insensitive_match() {
        assert_eq!(resolve(&corpus(), Some("naru")).unwrap(), 0);
        assert_eq!(resolve(&corpus(), Some("LEAC")).unwrap(), 2);
    }

    #[test]
    fn first_match_wins_over_better_match() {
        // "shippuden" only matches row 1; "naruto" matches both, row 0 first.
        assert_eq!(resolve(&corpus(), Some("Shippuden")).unwrap(), 1);
        assert_eq!(resolve(&corpus(), Some("Naruto: ")).unwrap(), 1);
        assert_eq!(resolve(&corpus(), Some("naruto")).unwrap(), 0);
    }

    #[test]
    fn query_is_literal_not_a_pattern() {
        assert!(resolve(&corpus(), Some("nar.to")).unwrap_err().is_not_found());
    }

    #[test]
    fn empty_absent_and_unmatched_queries_are_not_found() {
        for query in [None, Some(""), Some("clannad")] {
            let err = resolve(&corpus(), query).unwrap_err();
            assert!(err.is_not_found(), "{query:?} -> {err}");
        }
    }

    #[test]
    fn empty_corpus_matches_nothing() {
        let empty = Corpus::default();
        assert!(resolve(&empty, Some("anything")).is_err());
    }
}
