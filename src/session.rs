use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::keys::KeyInput;
use crate::metrics::{Metrics, MetricsInput, ResultRecord, WordLength};

/// Default number of characters kept visible ahead of the cursor when scrolling
pub const DEFAULT_LOOK_AHEAD: u16 = 20;

/// How the sample is laid out on screen
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Layout {
    /// Single row, scrolled horizontally to follow the cursor
    #[default]
    Scrolled,
    /// Wrapped across rows at the viewport width
    Wrapped,
}

/// Settings fixed for the lifetime of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub layout: Layout,
    pub look_ahead: u16,
    pub word_length: WordLength,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Scrolled,
            look_ahead: DEFAULT_LOOK_AHEAD,
            word_length: WordLength::Fixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Typing,
    Finished,
}

/// What a single key did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advanced { correct: bool },
    Retreated,
    Finished { correct: bool },
    Ignored,
}

/// One pass over a sample text: typed buffer, cursor, counters and timing
#[derive(Debug, Clone)]
pub struct Session {
    source_path: String,
    sample: Vec<char>,
    typed: Vec<Option<char>>,
    cursor: usize,
    total_keystrokes: usize,
    error_count: usize,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    config: SessionConfig,
}

impl Session {
    pub fn new(source_path: impl Into<String>, text: &str, config: SessionConfig) -> Self {
        let sample: Vec<char> = text.chars().collect();
        let typed = vec![None; sample.len()];

        Self {
            source_path: source_path.into(),
            sample,
            typed,
            cursor: 0,
            total_keystrokes: 0,
            error_count: 0,
            started_at: None,
            finished_at: None,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn sample(&self) -> &[char] {
        &self.sample
    }

    pub fn typed(&self) -> &[Option<char>] {
        &self.typed
    }

    pub fn total_chars(&self) -> usize {
        self.sample.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_keystrokes(&self) -> usize {
        self.total_keystrokes
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn phase(&self) -> SessionPhase {
        if self.cursor == self.sample.len() {
            SessionPhase::Finished
        } else if self.started_at.is_none() {
            SessionPhase::NotStarted
        } else {
            SessionPhase::Typing
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.phase() == SessionPhase::Finished
    }

    /// True when the typed character at `idx` matches the sample.
    /// Positions at or past the cursor are never correct.
    pub fn is_correct_at(&self, idx: usize) -> bool {
        idx < self.cursor && self.typed[idx] == self.sample.get(idx).copied()
    }

    pub fn apply(&mut self, key: KeyInput) -> Step {
        self.apply_at(key, Instant::now())
    }

    /// Apply `key` as if it arrived at `now`
    pub fn apply_at(&mut self, key: KeyInput, now: Instant) -> Step {
        if self.has_finished() {
            return Step::Ignored;
        }

        let step = match key {
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return Step::Ignored;
                }
                self.start_at(now);
                self.cursor -= 1;
                Step::Retreated
            }
            KeyInput::Printable(c) => {
                self.start_at(now);

                let expected = self.sample[self.cursor];
                let correct = c == expected;
                self.typed[self.cursor] = Some(c);
                self.total_keystrokes += 1;
                if !correct {
                    self.error_count += 1;
                }
                self.cursor += 1;

                if self.cursor == self.sample.len() {
                    self.finished_at = Some(now);
                    debug!(
                        target: "session",
                        keystrokes = self.total_keystrokes,
                        errors = self.error_count,
                        "session_finished"
                    );
                    Step::Finished { correct }
                } else {
                    Step::Advanced { correct }
                }
            }
            KeyInput::Abort | KeyInput::Resize | KeyInput::Other => Step::Ignored,
        };

        trace!(target: "session", ?key, ?step, cursor = self.cursor, "key_applied");
        step
    }

    fn start_at(&mut self, now: Instant) {
        if self.started_at.is_none() {
            debug!(target: "session", total_chars = self.sample.len(), "session_started");
            self.started_at = Some(now);
        }
    }

    /// Seconds between the first accepted key and completion, at least one
    pub fn elapsed_secs(&self) -> f64 {
        let secs = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64(),
            (Some(start), None) => start.elapsed().as_secs_f64(),
            _ => 0.0,
        };

        secs.max(1.0)
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(
            &MetricsInput {
                sample: &self.sample,
                typed: &self.typed,
                elapsed_secs: self.elapsed_secs(),
                total_keystrokes: self.total_keystrokes,
                error_count: self.error_count,
            },
            self.config.word_length,
        )
    }

    pub fn result(&self) -> ResultRecord {
        self.metrics().into_record(self.source_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session(text: &str) -> Session {
        Session::new("test.txt", text, SessionConfig::default())
    }

    fn type_str(session: &mut Session, s: &str, at: Instant) {
        for c in s.chars() {
            session.apply_at(KeyInput::Printable(c), at);
        }
    }

    #[test]
    fn test_session_new() {
        let s = session("hello");

        assert_eq!(s.total_chars(), 5);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.total_keystrokes(), 0);
        assert_eq!(s.error_count(), 0);
        assert!(s.typed().iter().all(Option::is_none));
        assert_eq!(s.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_first_key_starts_typing() {
        let mut s = session("hello");

        assert_eq!(s.apply(KeyInput::Printable('h')), Step::Advanced { correct: true });
        assert_eq!(s.phase(), SessionPhase::Typing);
        assert!(s.has_started());
    }

    #[test]
    fn test_wrong_char_counts_error_and_advances() {
        let mut s = session("hello");

        assert_eq!(s.apply(KeyInput::Printable('x')), Step::Advanced { correct: false });
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.total_keystrokes(), 1);
        assert_eq!(s.error_count(), 1);
        assert_eq!(s.typed()[0], Some('x'));
        assert!(!s.is_correct_at(0));
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut s = session("hello");

        assert_eq!(s.apply(KeyInput::Backspace), Step::Ignored);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.total_keystrokes(), 0);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_backspace_keeps_counters() {
        let mut s = session("hello");
        s.apply(KeyInput::Printable('x'));

        assert_eq!(s.apply(KeyInput::Backspace), Step::Retreated);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.total_keystrokes(), 1);
        assert_eq!(s.error_count(), 1);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut s = session("hello");

        assert_eq!(s.apply(KeyInput::Other), Step::Ignored);
        assert_eq!(s.apply(KeyInput::Abort), Step::Ignored);
        assert_eq!(s.apply(KeyInput::Resize), Step::Ignored);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_finishes_on_last_char() {
        let mut s = session("hi");

        s.apply(KeyInput::Printable('h'));
        assert!(!s.has_finished());
        assert_eq!(s.apply(KeyInput::Printable('i')), Step::Finished { correct: true });
        assert!(s.has_finished());

        // terminal state
        assert_eq!(s.apply(KeyInput::Backspace), Step::Ignored);
        assert_eq!(s.apply(KeyInput::Printable('x')), Step::Ignored);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn test_empty_sample_is_finished() {
        let s = session("");

        assert_eq!(s.phase(), SessionPhase::Finished);
        let metrics = s.metrics();
        assert_eq!(metrics.wpm, 0.0);
        assert_eq!(metrics.cpm, 0.0);
        assert_eq!(metrics.accuracy, 100.0);
        assert_eq!(metrics.consistency, 100.0);
    }

    #[test]
    fn test_correction_diverges_accuracy_and_consistency() {
        let mut s = session("ab");
        let t0 = Instant::now();

        s.apply_at(KeyInput::Printable('x'), t0);
        s.apply_at(KeyInput::Backspace, t0);
        s.apply_at(KeyInput::Printable('a'), t0);
        s.apply_at(KeyInput::Printable('b'), t0);

        assert_eq!(s.total_keystrokes(), 3);
        assert_eq!(s.error_count(), 1);
        let metrics = s.metrics();
        assert_eq!(metrics.accuracy, 100.0);
        assert!((metrics.consistency - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_elapsed_from_first_key_to_finish() {
        let mut s = session("cat");
        let t0 = Instant::now();

        s.apply_at(KeyInput::Printable('c'), t0);
        s.apply_at(KeyInput::Printable('a'), t0 + Duration::from_millis(500));
        s.apply_at(KeyInput::Printable('t'), t0 + Duration::from_secs(3));

        assert_eq!(s.elapsed_secs(), 3.0);
        assert_eq!(s.metrics().cpm, 60.0);
    }

    #[test]
    fn test_cat_end_to_end() {
        let mut s = session("cat");
        let t0 = Instant::now();

        s.apply_at(KeyInput::Printable('c'), t0);
        s.apply_at(KeyInput::Printable('a'), t0);
        s.apply_at(KeyInput::Printable('t'), t0 + Duration::from_secs(1));

        let record = s.result();
        assert_eq!(record.cpm, 180.0);
        assert_eq!(record.wpm, 36.0);
        assert_eq!(record.accuracy, 100.0);
        assert_eq!(record.consistency, 100.0);
        assert_eq!(record.source_path, "test.txt");
    }

    #[test]
    fn test_hi_end_to_end() {
        let mut s = session("hi");
        type_str(&mut s, "hx", Instant::now());

        assert_eq!(s.error_count(), 1);
        assert_eq!(s.total_keystrokes(), 2);
        let metrics = s.metrics();
        assert_eq!(metrics.accuracy, 50.0);
        assert_eq!(metrics.consistency, 50.0);
    }

    #[test]
    fn test_forward_matches_are_perfect() {
        for text in ["a", "hello world", "fn main() { println!(\"~\"); }"] {
            let mut s = session(text);
            type_str(&mut s, text, Instant::now());

            assert!(s.has_finished());
            let metrics = s.metrics();
            assert_eq!(metrics.accuracy, 100.0);
            assert_eq!(metrics.consistency, 100.0);
        }
    }

    #[test]
    fn test_error_count_never_exceeds_keystrokes() {
        let mut s = session("the quick brown fox");
        let keys = [
            KeyInput::Printable('x'),
            KeyInput::Backspace,
            KeyInput::Backspace,
            KeyInput::Printable('t'),
            KeyInput::Other,
            KeyInput::Printable('y'),
            KeyInput::Printable('z'),
            KeyInput::Backspace,
            KeyInput::Printable('e'),
        ];

        for key in keys {
            s.apply(key);
            assert!(s.error_count() <= s.total_keystrokes());
            assert!(s.cursor() <= s.total_chars());
        }
    }

    #[test]
    fn test_dynamic_word_length_config() {
        let config = SessionConfig {
            word_length: WordLength::Dynamic,
            ..SessionConfig::default()
        };
        let mut s = Session::new("inline", "ab ab", config);
        type_str(&mut s, "ab ab", Instant::now());

        // 4 non-whitespace chars, 2 words of length 2, 1 second floor
        assert_eq!(s.metrics().cpm, 240.0);
        assert_eq!(s.metrics().wpm, 120.0);
    }

    #[test]
    fn test_layout_display() {
        assert_eq!(Layout::Scrolled.to_string(), "scrolled");
        assert_eq!(Layout::Wrapped.to_string(), "wrapped");
    }
}
