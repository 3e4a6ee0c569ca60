use crate::error::{CorpusError, Result};
use crate::feed::{read_rows, FeedRow};
use crate::types::Item;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

/// Default row cap. The similarity matrix is quadratic in this number.
pub const DEFAULT_MAX_ROWS: usize = 7000;

/// Ordered, immutable snapshot of the catalog.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<Item>,
    folded_names: Vec<String>,
}

impl Corpus {
    /// Loads the first `max_rows` rows of a CSV feed.
    pub fn load(path: impl AsRef<Path>, max_rows: usize) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| CorpusError::Open {
            origin: origin.clone(),
            source,
        })?;
        let corpus = Self::from_reader(BufReader::new(file), &origin, max_rows)?;
        log::info!(
            "Loaded {} catalog rows from {} in {:?}",
            corpus.len(),
            path.display(),
            started.elapsed()
        );
        Ok(corpus)
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str, max_rows: usize) -> Result<Self> {
        let rows = read_rows(reader, origin, max_rows)?;
        Ok(Self::from_rows(rows, max_rows))
    }

    /// Builds a corpus from already-parsed rows, keeping the first `max_rows`.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = FeedRow>, max_rows: usize) -> Self {
        let items: Vec<Item> = rows
            .into_iter()
            .take(max_rows)
            .enumerate()
            .map(|(row_id, row)| Item {
                row_id,
                name: row.name,
                genres: row.genres.unwrap_or_default(),
                image_url: row.image_url,
                score: row.score,
            })
            .collect();
        let folded_names = items.iter().map(|item| fold_case(&item.name)).collect();
        Self {
            items,
            folded_names,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, row_id: usize) -> Option<&Item> {
        self.items.get(row_id)
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Case-folded names, index-aligned with `items()`.
    #[must_use]
    pub fn folded_names(&self) -> &[String] {
        &self.folded_names
    }
}

/// Case folding shared by name lookups and their queries.
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
