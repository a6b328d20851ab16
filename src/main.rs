use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::{Arc, Mutex},
};
use tapline::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    language::Corpus,
    runtime::{key_action, CrosstermEventSource, EventSource, FixedTicker, Runner, TermEvent},
    Control, Session, SessionEvent,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that enables the log file and sets its filter
const LOG_ENV: &str = "TAPLINE_LOG";

/// terminal typing trainer with a rolling queue of generated sentences
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type generated sentences against a countdown. Completed lines scroll away and a fresh sentence joins the queue. Tab asks to restart, Enter confirms, Esc quits."
)]
pub struct Cli {
    /// number of words per sentence
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// length of the countdown in seconds
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// disable the countdown
    #[clap(long, conflicts_with = "secs")]
    no_timer: bool,

    /// milliseconds between timer ticks
    #[clap(long)]
    tick_ms: Option<u64>,

    /// disable the restart prompt
    #[clap(long)]
    no_restart_prompt: bool,

    /// only advance once every character of a line is correct
    #[clap(long)]
    strict: bool,

    /// write the resulting settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay command line flags on the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(words) = self.words {
            config.sentence_length = words;
        }
        if let Some(secs) = self.secs {
            config.timer_secs = Some(secs);
        }
        if self.no_timer {
            config.timer_secs = None;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if self.no_restart_prompt {
            config.restart_prompt = false;
        }
        if self.strict {
            config.strict = true;
        }
        config
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return Ok(());
    };
    let Some(path) = AppDirs::log_path() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging()?;

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let session_config = config.session_config()?;
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }

    let corpus = Arc::new(Corpus::embedded()?);
    let mut session = Session::new(corpus, session_config)?;
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );

    let _guard = RawTerminal::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    run(&mut terminal, &mut session, &mut runner)
}

/// Raw mode plus alternate screen, undone on drop whichever way `main` exits
struct RawTerminal;

impl RawTerminal {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            tracing::warn!(%err, "failed to leave raw mode");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            tracing::warn!(%err, "failed to leave alternate screen");
        }
    }
}

fn run<B: Backend, E: EventSource, R: rand::Rng>(
    terminal: &mut Terminal<B>,
    session: &mut Session<R>,
    runner: &mut Runner<E, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*session, f.area()))?;

    loop {
        let event = match runner.step() {
            TermEvent::Tick => SessionEvent::Tick(runner.interval()),
            TermEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*session, f.area()))?;
                continue;
            }
            TermEvent::Key(key) => match key_action(&key) {
                Some(action) => SessionEvent::Key(action),
                None => continue,
            },
        };

        let was_started = session.has_started();
        if session.handle(event) == Control::Quit {
            break;
        }
        if !was_started && session.has_started() {
            // countdown ticks are counted from the first keystroke
            runner.resync();
        }

        terminal.draw(|f| f.render_widget(&*session, f.area()))?;
    }

    Ok(())
}
