use std::io;
use std::path::PathBuf;

/// Failures surfaced by the library. Setup failures (no sample, terminal)
/// abort before a session starts; score failures are reported after one ends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no sample texts found in {}", .dir.display())]
    NoSamples { dir: PathBuf },

    #[error("unable to scan sample directory {}", .dir.display())]
    ScanDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to read sample {}", .path.display())]
    ReadSample {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal i/o failed")]
    Terminal(#[from] io::Error),

    #[error("key source closed before the session finished")]
    KeySourceClosed,

    #[error("unable to record score to {}", .path.display())]
    Score {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unable to save config to {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
