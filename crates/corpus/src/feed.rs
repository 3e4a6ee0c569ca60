use crate::error::{CorpusError, Result};
use csv::StringRecord;
use std::io::Read;

pub const NAME_COLUMN: &str = "name";
pub const GENRES_COLUMN: &str = "genres";
pub const IMAGE_URL_COLUMN: &str = "image_url";
pub const SCORE_COLUMN: &str = "score";

/// One row as the feed hands it over, before row ids are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedRow {
    pub name: String,
    pub genres: Option<String>,
    pub image_url: Option<String>,
    pub score: Option<f64>,
}

impl FeedRow {
    #[must_use]
    pub fn new(name: impl Into<String>, genres: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            genres: Some(genres.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    name: usize,
    genres: usize,
    image_url: usize,
    score: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
        };

        let name = find(NAME_COLUMN).ok_or(CorpusError::MissingColumn(NAME_COLUMN))?;
        let genres = find(GENRES_COLUMN).ok_or(CorpusError::MissingColumn(GENRES_COLUMN))?;
        let image_url =
            find(IMAGE_URL_COLUMN).ok_or(CorpusError::MissingColumn(IMAGE_URL_COLUMN))?;
        let score = find(SCORE_COLUMN);
        if score.is_none() {
            log::warn!("Feed has no `{SCORE_COLUMN}` column; scores will be absent");
        }

        Ok(Self {
            name,
            genres,
            image_url,
            score,
        })
    }

    fn row(&self, record: &StringRecord, unparsed_scores: &mut usize) -> FeedRow {
        let cell = |idx: usize| record.get(idx).filter(|v| !v.is_empty());

        let score = self.score.and_then(cell).and_then(|raw| {
            let parsed = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            if parsed.is_none() && !raw.trim().is_empty() {
                *unparsed_scores += 1;
            }
            parsed
        });

        FeedRow {
            name: record.get(self.name).unwrap_or_default().to_string(),
            genres: cell(self.genres).map(str::to_string),
            image_url: cell(self.image_url).map(str::to_string),
            score,
        }
    }
}

/// Reads at most `max_rows` rows from a CSV feed, in file order.
///
/// Records past the cap are never parsed, so a malformed tail does not
/// fail the load.
pub fn read_rows<R: Read>(reader: R, origin: &str, max_rows: usize) -> Result<Vec<FeedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| CorpusError::Unreadable {
            origin: origin.to_string(),
            source,
        })?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut unparsed_scores = 0usize;
    let mut record = StringRecord::new();
    while rows.len() < max_rows {
        let more = reader
            .read_record(&mut record)
            .map_err(|source| CorpusError::Malformed {
                line: source.position().map_or(0, csv::Position::line),
                source,
            })?;
        if !more {
            break;
        }
        rows.push(layout.row(&record, &mut unparsed_scores));
    }

    if unparsed_scores > 0 {
        log::warn!("{unparsed_scores} rows carried a non-numeric score; treated as absent");
    }
    Ok(rows)
}
