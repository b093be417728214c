use serde::{Deserialize, Serialize};

/// Average word length used when converting characters to words.
pub const FIXED_WORD_LENGTH: f64 = 5.0;

/// How many characters make up one "word" for the wpm figure
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WordLength {
    /// Always [`FIXED_WORD_LENGTH`] characters
    #[default]
    Fixed,
    /// Mean length of the whitespace separated words of the sample
    Dynamic,
}

impl WordLength {
    pub fn average_for(&self, sample: &[char]) -> f64 {
        match self {
            WordLength::Fixed => FIXED_WORD_LENGTH,
            WordLength::Dynamic => {
                let words = word_count(sample);
                if words == 0 {
                    FIXED_WORD_LENGTH
                } else {
                    non_whitespace_count(sample) as f64 / words as f64
                }
            }
        }
    }
}

/// Everything the calculator needs from a finished session
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
    pub sample: &'a [char],
    pub typed: &'a [Option<char>],
    pub elapsed_secs: f64,
    pub total_keystrokes: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub consistency: f64,
}

impl Metrics {
    pub fn compute(input: &MetricsInput<'_>, word_length: WordLength) -> Self {
        let cpm = cpm(input.sample, input.elapsed_secs);

        Self {
            wpm: cpm / word_length.average_for(input.sample),
            cpm,
            accuracy: accuracy(input.sample, input.typed),
            consistency: consistency(input.total_keystrokes, input.error_count),
        }
    }

    pub fn into_record(self, source_path: impl Into<String>) -> ResultRecord {
        ResultRecord {
            wpm: self.wpm,
            cpm: self.cpm,
            accuracy: self.accuracy,
            consistency: self.consistency,
            source_path: source_path.into(),
        }
    }
}

/// Final, immutable outcome of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub source_path: String,
}

impl ResultRecord {
    /// `wpm,cpm,accuracy,consistency,source_path` with two decimals per figure
    pub fn csv_fields(&self) -> [String; 5] {
        [
            format!("{:.2}", self.wpm),
            format!("{:.2}", self.cpm),
            format!("{:.2}", self.accuracy),
            format!("{:.2}", self.consistency),
            self.source_path.clone(),
        ]
    }
}

pub fn non_whitespace_count(sample: &[char]) -> usize {
    sample.iter().filter(|c| !c.is_whitespace()).count()
}

/// Number of maximal runs of non-whitespace characters
pub fn word_count(sample: &[char]) -> usize {
    sample
        .split(|c| c.is_whitespace())
        .filter(|word| !word.is_empty())
        .count()
}

/// Characters per minute over the sample's non-whitespace characters.
/// `elapsed_secs` is floored to one second.
pub fn cpm(sample: &[char], elapsed_secs: f64) -> f64 {
    let elapsed = elapsed_secs.max(1.0);
    (non_whitespace_count(sample) as f64 / elapsed) * 60.0
}

/// Share of positions whose final typed character matches the sample.
/// An empty sample counts as fully accurate.
pub fn accuracy(sample: &[char], typed: &[Option<char>]) -> f64 {
    if sample.is_empty() {
        return 100.0;
    }

    let correct = sample
        .iter()
        .zip(typed)
        .filter(|(expected, typed)| **typed == Some(**expected))
        .count();

    correct as f64 * 100.0 / sample.len() as f64
}

/// Share of keystrokes that were right when made, corrections notwithstanding
pub fn consistency(total_keystrokes: usize, error_count: usize) -> f64 {
    if total_keystrokes == 0 {
        return 100.0;
    }

    total_keystrokes.saturating_sub(error_count) as f64 * 100.0 / total_keystrokes as f64
}
