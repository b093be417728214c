use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics::ResultRecord;

/// Receives the record of every completed session
pub trait ScoreSink {
    fn record(&mut self, record: &ResultRecord) -> Result<()>;
}

/// Discards records (`--no-save`)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScoreSink;

impl ScoreSink for NullScoreSink {
    fn record(&mut self, _record: &ResultRecord) -> Result<()> {
        Ok(())
    }
}

/// Appends `wpm,cpm,accuracy,consistency,source_path` lines to a file.
/// No header, no quoting.
#[derive(Debug, Clone)]
pub struct CsvScoreSink {
    path: PathBuf,
}

impl CsvScoreSink {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn score_error(&self, source: impl Into<csv::Error>) -> Error {
        Error::Score {
            path: self.path.clone(),
            source: source.into(),
        }
    }
}

impl ScoreSink for CsvScoreSink {
    fn record(&mut self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.score_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.score_error(e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        writer
            .write_record(record.csv_fields())
            .map_err(|e| self.score_error(e))?;
        writer.flush().map_err(|e| self.score_error(e))?;

        debug!(target: "score", path = %self.path.display(), "score_recorded");
        Ok(())
    }
}

/// Read back every record in a score file, oldest first
pub fn read_scores<P: AsRef<Path>>(path: P) -> Result<Vec<ResultRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|source| Error::Score {
            path: path.to_path_buf(),
            source,
        })?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ResultRecord>, _>>()
        .map_err(|source| Error::Score {
            path: path.to_path_buf(),
            source,
        })
}
