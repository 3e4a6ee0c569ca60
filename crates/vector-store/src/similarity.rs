use crate::error::{Result, VectorStoreError};
use crate::vectorizer::EncodedMatrix;
use ndarray::{Array2, ArrayView1};
use std::time::Instant;

/// Hard ceiling on rows accepted for an all-pairs matrix (20k rows ≈ 1.6 GB of f32).
pub const MAX_ROWS_CEILING: usize = 20_000;

/// Dense, symmetric all-pairs cosine similarity over encoded items.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: Array2<f32>,
}

impl SimilarityMatrix {
    /// Computes cosine similarity for every pair of rows.
    ///
    /// Dot products are accumulated through per-column postings, so cost
    /// tracks the number of co-occurring tokens rather than the vocabulary
    /// width. Rows without any vocabulary token get similarity 0 to
    /// everything, themselves included.
    pub fn build(encoded: &EncodedMatrix) -> Result<Self> {
        let (n, n_cols) = encoded.shape();
        if n > MAX_ROWS_CEILING {
            return Err(VectorStoreError::CorpusTooLarge {
                rows: n,
                limit: MAX_ROWS_CEILING,
            });
        }
        let started = Instant::now();

        let mut postings: Vec<Vec<(usize, u32)>> = vec![Vec::new(); n_cols];
        for (row, sparse) in encoded.rows().iter().enumerate() {
            for &(col, count) in sparse.entries() {
                postings[col].push((row, count));
            }
        }
        let norms: Vec<f64> = encoded
            .rows()
            .iter()
            .map(|r| (r.squared_norm() as f64).sqrt())
            .collect();

        let mut values = Array2::<f32>::zeros((n, n));
        let mut dots = vec![0u64; n];
        let mut touched: Vec<usize> = Vec::new();

        for (i, row) in encoded.rows().iter().enumerate() {
            if row.is_zero() {
                // 0/0: leave the whole row and column at zero.
                continue;
            }
            values[[i, i]] = 1.0;

            for &(col, count) in row.entries() {
                // Postings are in row order; only the upper triangle is needed.
                let start = postings[col].partition_point(|&(j, _)| j <= i);
                for &(j, other) in &postings[col][start..] {
                    if dots[j] == 0 {
                        touched.push(j);
                    }
                    dots[j] += u64::from(count) * u64::from(other);
                }
            }

            for &j in &touched {
                let cosine = (dots[j] as f64 / (norms[i] * norms[j])).clamp(0.0, 1.0) as f32;
                values[[i, j]] = cosine;
                values[[j, i]] = cosine;
                dots[j] = 0;
            }
            touched.clear();
        }

        log::info!(
            "Built {n}x{n} similarity matrix in {:?}",
            started.elapsed()
        );
        Ok(Self { values })
    }

    /// Number of items covered (the matrix is `len × len`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.values.get((i, j)).copied()
    }

    /// Similarities of item `i` against every item, by row id.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<ArrayView1<'_, f32>> {
        (i < self.len()).then(|| self.values.row(i))
    }

    #[must_use]
    pub const fn as_array(&self) -> &Array2<f32> {
        &self.values
    }
}
