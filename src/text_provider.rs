use std::fs;
use std::path::{Path, PathBuf};

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::error::{Error, Result};

/// Directory searched for samples when none is configured
pub const DEFAULT_TEXTS_DIR: &str = "./texts";

/// Display path used for samples passed on the command line
pub const INLINE_SOURCE: &str = "<inline>";

/// A sample text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub display_path: String,
    pub text: String,
}

impl Sample {
    pub fn new(display_path: impl Into<String>, raw: &str) -> Self {
        Self {
            display_path: display_path.into(),
            text: normalize(raw),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Line breaks and tabs cannot be typed, so they become single spaces;
/// trailing whitespace is dropped.
pub fn normalize(raw: &str) -> String {
    raw.trim_end()
        .replace("\r\n", " ")
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

pub trait TextProvider {
    fn provide_sample(&self) -> Result<Sample>;
}

/// Picks a random regular file from a directory
#[derive(Debug, Clone)]
pub struct DirectoryTextProvider {
    dir: PathBuf,
}

impl DirectoryTextProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File names of the regular files in the directory, sorted
    pub fn entries(&self) -> Result<Vec<String>> {
        let scan_error = |source| Error::ScanDir {
            dir: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(scan_error)? {
            let entry = entry.map_err(scan_error)?;
            if entry.file_type().map_err(scan_error)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        Ok(names)
    }

    pub fn provide_sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Sample> {
        let entries = self.entries()?;
        let name = entries.choose(rng).ok_or_else(|| Error::NoSamples {
            dir: self.dir.clone(),
        })?;

        let path = self.dir.join(name);
        let display_path = format!("{}/{}", self.dir.display(), name);
        debug!(target: "text", candidates = entries.len(), path = %display_path, "sample_selected");

        let raw = fs::read_to_string(&path).map_err(|source| Error::ReadSample {
            path: path.clone(),
            source,
        })?;

        Ok(Sample::new(display_path, &raw))
    }
}

impl TextProvider for DirectoryTextProvider {
    fn provide_sample(&self) -> Result<Sample> {
        self.provide_sample_with(&mut rand::thread_rng())
    }
}

/// A sample given directly, e.g. `-p "the quick brown fox"`
#[derive(Debug, Clone)]
pub struct InlineTextProvider {
    text: String,
}

impl InlineTextProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextProvider for InlineTextProvider {
    fn provide_sample(&self) -> Result<Sample> {
        Ok(Sample::new(INLINE_SOURCE, &self.text))
    }
}
