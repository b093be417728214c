use std::{
    io::{self, stdin, Stdout},
    path::PathBuf,
    sync::Once,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use typist::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    metrics::{ResultRecord, WordLength},
    runtime::{CrosstermKeySource, Runner, SessionOutcome},
    score::{read_scores, CsvScoreSink, NullScoreSink, ScoreSink},
    session::Session,
    text_provider::{DirectoryTextProvider, InlineTextProvider, TextProvider, DEFAULT_TEXTS_DIR},
};

/// terminal typing trainer: type a random sample text, get wpm, accuracy and consistency
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// directory to pick a random sample text from
    #[clap(short = 't', long = "texts")]
    texts_dir: Option<PathBuf>,

    /// custom sample text to type instead of a file
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// wrap the sample across rows instead of scrolling a single row
    #[clap(short = 'w', long)]
    wrap: bool,

    /// characters kept visible ahead of the cursor when scrolling
    #[clap(long)]
    look_ahead: Option<u16>,

    /// derive the average word length from the sample instead of using 5
    #[clap(long)]
    dynamic_word_length: bool,

    /// ring the terminal bell on every mistyped key
    #[clap(short = 'b', long)]
    bell: bool,

    /// file to append scores to
    #[clap(long)]
    scores: Option<PathBuf>,

    /// do not record the score of this session
    #[clap(long)]
    no_save: bool,

    /// print recorded scores and exit
    #[clap(long)]
    history: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// log at debug level
    #[clap(short = 'd', long)]
    debug: bool,
}

impl Cli {
    /// Command line flags layered over the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if self.wrap {
            config.wrap = true;
        }
        if let Some(look_ahead) = self.look_ahead {
            config.look_ahead = look_ahead;
        }
        if self.dynamic_word_length {
            config.word_length = WordLength::Dynamic;
        }
        if let Some(dir) = &self.texts_dir {
            config.texts_dir = Some(dir.clone());
        }
        if self.no_save {
            config.save_scores = false;
        }
        if self.bell {
            config.bell = true;
        }
        config
    }

    fn scores_path(&self) -> PathBuf {
        self.scores
            .clone()
            .or_else(AppDirs::scores_path)
            .unwrap_or_else(|| PathBuf::from("scores.csv"))
    }

    fn text_provider(&self, config: &Config) -> Box<dyn TextProvider> {
        match &self.prompt {
            Some(prompt) => Box::new(InlineTextProvider::new(prompt.clone())),
            None => Box::new(DirectoryTextProvider::new(
                config
                    .texts_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TEXTS_DIR)),
            )),
        }
    }
}

fn format_record(record: &ResultRecord) -> String {
    format!(
        "{:.2} wpm   {:.2} cpm   {:.2}% acc   {:.2}% consistency   {}",
        record.wpm, record.cpm, record.accuracy, record.consistency, record.source_path
    )
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

/// Run `setup` once raw mode is on; undo raw mode with `restore` if it fails
fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().inspect_err(|_| {
        let _ = restore();
    })
}

fn enter_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            error!(target: "runtime.panic", %info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let scores_path = cli.scores_path();
    if cli.history {
        if !scores_path.exists() {
            return Ok(());
        }
        for record in read_scores(&scores_path)? {
            println!("{}", format_record(&record));
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("."));
    let _log_guard = logging::init(&log_dir, cli.debug)
        .with_context(|| format!("unable to set up logging in {}", log_dir.display()))?;
    info!(target: "runtime", "startup");

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
    }

    let sample = cli
        .text_provider(&config)
        .provide_sample()
        .context("no sample text available")?;
    info!(
        target: "runtime",
        path = sample.display_path.as_str(),
        chars = sample.char_count(),
        "sample_loaded"
    );

    let mut sink: Box<dyn ScoreSink> = if config.save_scores {
        Box::new(CsvScoreSink::with_path(&scores_path))
    } else {
        Box::new(NullScoreSink)
    };

    let mut session = Session::new(sample.display_path, &sample.text, config.session_config());

    install_panic_hook();
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(enter_terminal, restore_terminal)
        .context("unable to set up the terminal")?;

    let mut runner = Runner::new(CrosstermKeySource);
    if config.bell {
        runner = runner.with_bell(io::stdout());
    }
    let outcome = runner.run(&mut terminal, &mut session, sink.as_mut());

    restore_terminal()?;

    match outcome? {
        SessionOutcome::Completed { record, save_error } => {
            println!("{}", format_record(&record));
            if let Some(e) = save_error {
                eprintln!("warning: {:#}", anyhow::Error::from(e));
            }
        }
        SessionOutcome::Aborted => {}
    }

    Ok(())
}
