use std::collections::VecDeque;
use std::io::Write;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::keys::KeyInput;
use crate::metrics::ResultRecord;
use crate::render;
use crate::score::ScoreSink;
use crate::session::{Session, Step};
use crate::ui;

/// Blocking source of classified key presses
pub trait KeySource {
    /// Block until the next event and classify it
    fn next_key(&mut self) -> Result<KeyInput>;

    /// Block until any key is pressed, calling `redraw` on every resize
    fn wait_for_key(&mut self, redraw: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        loop {
            match self.next_key()? {
                KeyInput::Resize => redraw()?,
                _ => return Ok(()),
            }
        }
    }
}

/// Production key source reading crossterm events on the calling thread
#[derive(Debug, Default)]
pub struct CrosstermKeySource;

impl KeySource for CrosstermKeySource {
    fn next_key(&mut self) -> Result<KeyInput> {
        Ok(KeyInput::from_event(event::read()?))
    }

    fn wait_for_key(&mut self, redraw: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(()),
                Event::Resize(..) => redraw()?,
                _ => {}
            }
        }
    }
}

/// Replays a fixed key sequence, for driving sessions without a terminal
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeySource {
    keys: VecDeque<KeyInput>,
}

impl ScriptedKeySource {
    pub fn new(keys: impl IntoIterator<Item = KeyInput>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// One printable key per character of `text`
    pub fn typing(text: &str) -> Self {
        Self::new(text.chars().map(KeyInput::Printable))
    }

    pub fn then(mut self, key: KeyInput) -> Self {
        self.keys.push_back(key);
        self
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeySource {
    fn next_key(&mut self) -> Result<KeyInput> {
        self.keys.pop_front().ok_or(Error::KeySourceClosed)
    }
}

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The whole sample was typed. `save_error` is set if the score sink failed.
    Completed {
        record: ResultRecord,
        save_error: Option<Error>,
    },
    /// The user quit before the end; nothing was recorded
    Aborted,
}

const BEL: &[u8] = b"\x07";

/// Drives one session: redraw, block for a key, apply it, until the sample is done
pub struct Runner<K: KeySource> {
    keys: K,
    bell: Option<Box<dyn Write>>,
}

impl<K: KeySource> Runner<K> {
    pub fn new(keys: K) -> Self {
        Self { keys, bell: None }
    }

    /// Ring `bell` with a BEL byte on every mistyped key
    pub fn with_bell(mut self, bell: impl Write + 'static) -> Self {
        self.bell = Some(Box::new(bell));
        self
    }

    fn ring(&mut self) {
        let Some(bell) = self.bell.as_mut() else {
            return;
        };
        if let Err(e) = bell.write_all(BEL).and_then(|()| bell.flush()) {
            warn!(target: "runtime", error = %e, "bell_failed");
        }
    }

    pub fn into_inner(self) -> K {
        self.keys
    }

    /// Run the typing loop, then show results until a key is pressed.
    /// Returns `None` when the user aborted.
    pub fn type_session<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        session: &mut Session,
    ) -> Result<Option<ResultRecord>> {
        let strategy = render::strategy_for(session.config());

        loop {
            terminal.draw(|f| ui::draw_typing(f, session, strategy.as_ref()))?;

            if session.has_finished() {
                break;
            }

            match self.keys.next_key()? {
                KeyInput::Abort => {
                    info!(
                        target: "runtime",
                        cursor = session.cursor(),
                        total_chars = session.total_chars(),
                        "session_aborted"
                    );
                    return Ok(None);
                }
                key => match session.apply(key) {
                    Step::Advanced { correct: false } | Step::Finished { correct: false } => {
                        self.ring()
                    }
                    _ => {}
                },
            }
        }

        let record = session.result();
        info!(
            target: "runtime",
            wpm = record.wpm,
            cpm = record.cpm,
            accuracy = record.accuracy,
            consistency = record.consistency,
            source = record.source_path.as_str(),
            "session_complete"
        );

        let mut draw_results = || -> Result<()> {
            terminal.draw(|f| ui::draw_results(f, &record))?;
            Ok(())
        };
        draw_results()?;
        self.keys.wait_for_key(&mut draw_results)?;

        Ok(Some(record))
    }

    /// [`Runner::type_session`] followed by handing the record to `sink`.
    /// A sink failure is logged and returned alongside the record, never raised.
    pub fn run<B: Backend, S: ScoreSink + ?Sized>(
        &mut self,
        terminal: &mut Terminal<B>,
        session: &mut Session,
        sink: &mut S,
    ) -> Result<SessionOutcome> {
        let Some(record) = self.type_session(terminal, session)? else {
            return Ok(SessionOutcome::Aborted);
        };

        let save_error = match sink.record(&record) {
            Ok(()) => None,
            Err(e) => {
                warn!(target: "score", error = %e, "score_record_failed");
                Some(e)
            }
        };

        Ok(SessionOutcome::Completed { record, save_error })
    }
}
