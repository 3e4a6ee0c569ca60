use catalog_vector_store::SimilarityMatrix;
use std::cmp::Ordering;

/// Similarity descending, then row id ascending.
fn by_similarity(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Top `top_n` neighbours of `anchor_id`, never including the anchor itself.
///
/// The ordering is total, so the many exact ties at 0 between items that
/// share no category token come back in row order.
#[must_use]
pub fn rank(similarity: &SimilarityMatrix, anchor_id: usize, top_n: usize) -> Vec<(usize, f32)> {
    let Some(row) = similarity.row(anchor_id) else {
        log::debug!("Anchor {anchor_id} outside similarity matrix");
        return Vec::new();
    };
    if top_n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = row
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != anchor_id)
        .map(|(idx, &value)| (idx, value))
        .collect();

    if scored.len() > top_n {
        scored.select_nth_unstable_by(top_n - 1, by_similarity);
        scored.truncate(top_n);
    }
    scored.sort_by(by_similarity);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_vector_store::EncodedMatrix;
    use proptest::prelude::*;

    fn matrix(rows: Vec<Vec<(usize, u32)>>, n_cols: usize) -> SimilarityMatrix {
        SimilarityMatrix::build(&EncodedMatrix::from_rows(rows, n_cols).unwrap()).unwrap()
    }

    #[test]
    fn orders_by_similarity_then_row_id() {
        let sim = matrix(
            vec![
                vec![(0, 1), (1, 1)],
                vec![(2, 1)],
                vec![(0, 1)],
                vec![(0, 1), (1, 1)],
                vec![],
            ],
            3,
        );

        let ids: Vec<usize> = rank(&sim, 0, 10).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn truncates_to_top_n() {
        let sim = matrix(vec![vec![(0, 1)]; 6], 1);
        let ranked = rank(&sim, 2, 3);
        assert_eq!(
            ranked.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![0, 1, 3]
        );
        assert!(rank(&sim, 2, 0).is_empty());
    }

    #[test]
    fn unknown_anchor_yields_nothing() {
        let sim = matrix(vec![vec![(0, 1)]; 2], 1);
        assert!(rank(&sim, 7, 5).is_empty());
    }

    proptest! {
        #[test]
        fn proptest_rank_excludes_anchor_and_is_sorted(
            rows in prop::collection::vec(prop::collection::vec((0usize..4, 1u32..3), 0..4), 1..15),
            anchor_seed in any::<usize>(),
            top_n in 0usize..20,
        ) {
            let n = rows.len();
            let sim = matrix(rows, 4);
            let anchor = anchor_seed % n;
            let ranked = rank(&sim, anchor, top_n);

            prop_assert_eq!(ranked.len(), top_n.min(n - 1));
            prop_assert!(ranked.iter().all(|(id, _)| *id != anchor));
            for pair in ranked.windows(2) {
                prop_assert_eq!(by_similarity(&pair[0], &pair[1]), Ordering::Less);
            }
        }
    }
}
