use crate::error::{Error, Result};
use crate::language::Corpus;
use crate::matching::{self, InputBuffer, Outcome};
use crate::queue::SentenceQueue;
use crate::sentence::{GeneratorConfig, Sentence, SentenceGenerator};
use crate::timer::{Countdown, TimerConfig, TimerEvent};
use crate::typing_policy::CompletionPolicy;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shown while waiting for a restart to be confirmed
pub const RESTART_PROMPT: &str = "🔄 Restart test?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub generator: GeneratorConfig,
    /// `None` runs untimed
    pub timer: Option<TimerConfig>,
    /// Whether restart requests are honoured
    pub restart_prompt: bool,
    pub completion: CompletionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            timer: Some(TimerConfig::default()),
            restart_prompt: true,
            completion: CompletionPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// The plain variant: no countdown, no restart prompt.
    pub fn untimed() -> Self {
        Self {
            timer: None,
            restart_prompt: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Typing,
    RestartPrompt,
    /// Passed through when the countdown runs out, before the next run starts
    TimedOut,
}

/// The closed set of key events the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Char(char),
    Backspace,
    RestartRequest,
    Confirm,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Key(KeyAction),
    /// Time elapsed since the previous tick
    Tick(Duration),
    Timeout,
}

impl From<KeyAction> for SessionEvent {
    fn from(action: KeyAction) -> Self {
        Self::Key(action)
    }
}

/// What the driver should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Totals of the run that last ended by timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_completed: usize,
    pub keystrokes: usize,
}

/// One typing session: queue, typed input, countdown and prompt state.
#[derive(Debug)]
pub struct Session<R: Rng = ThreadRng> {
    config: SessionConfig,
    generator: SentenceGenerator<R>,
    queue: SentenceQueue,
    input: InputBuffer,
    state: SessionState,
    timer: Option<Countdown>,
    prompt: String,
    keystrokes: usize,
    lines_completed: usize,
    timeouts: usize,
    last_run: Option<RunSummary>,
}

impl Session<ThreadRng> {
    pub fn new(corpus: Arc<Corpus>, config: SessionConfig) -> Result<Self> {
        Self::with_rng(corpus, config, rand::thread_rng())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(corpus: Arc<Corpus>, config: SessionConfig, rng: R) -> Result<Self> {
        if let Some(timer) = config.timer {
            if timer.total.is_zero() {
                return Err(Error::Config("timer duration must be positive".to_string()));
            }
            if timer.interval.is_zero() {
                return Err(Error::Config("tick interval must be positive".to_string()));
            }
        }

        let mut generator = SentenceGenerator::with_rng(corpus, config.generator, rng)?;
        let queue = SentenceQueue::new(&mut generator);
        info!(
            timed = config.timer.is_some(),
            completion = %config.completion,
            "session started"
        );

        Ok(Self {
            config,
            generator,
            queue,
            input: InputBuffer::new(),
            state: SessionState::Typing,
            timer: config.timer.map(Countdown::new),
            prompt: String::new(),
            keystrokes: 0,
            lines_completed: 0,
            timeouts: 0,
            last_run: None,
        })
    }

    /// Apply one event to completion.
    pub fn handle(&mut self, event: SessionEvent) -> Control {
        match event {
            SessionEvent::Key(KeyAction::Quit) => {
                info!(state = %self.state, "quit requested");
                return Control::Quit;
            }
            SessionEvent::Key(action) => self.on_key(action),
            SessionEvent::Tick(elapsed) => self.on_tick(elapsed),
            SessionEvent::Timeout => {
                if self.timer.is_some() {
                    self.time_out();
                }
            }
        }
        Control::Continue
    }

    fn on_key(&mut self, action: KeyAction) {
        match (self.state, action) {
            (SessionState::Typing, KeyAction::Char(c)) => self.type_char(c),
            (SessionState::Typing, KeyAction::Backspace) => {
                self.input.backspace();
            }
            (SessionState::Typing, KeyAction::RestartRequest) if self.config.restart_prompt => {
                self.state = SessionState::RestartPrompt;
                self.prompt = RESTART_PROMPT.to_string();
            }
            (SessionState::RestartPrompt, KeyAction::Confirm) => {
                debug!("restart confirmed");
                self.reinitialize();
            }
            // the prompt only yields to an explicit confirm
            _ => {}
        }
    }

    fn type_char(&mut self, c: char) {
        if self.keystrokes == 0 {
            if let Some(timer) = self.timer.as_mut() {
                timer.start();
            }
        }
        self.keystrokes += 1;

        if !self.input.push(self.queue.target(), c) {
            return;
        }

        if matching::is_complete(self.queue.target(), &self.input, self.config.completion) {
            self.lines_completed += 1;
            self.input.clear();
            self.queue.advance(&mut self.generator);
        }
    }

    fn on_tick(&mut self, elapsed: Duration) {
        let event = match self.timer.as_mut() {
            Some(timer) => timer.on_tick(elapsed),
            None => None,
        };

        if let Some(TimerEvent::Timeout) = event {
            self.time_out();
        }
    }

    fn time_out(&mut self) {
        self.state = SessionState::TimedOut;
        self.timeouts += 1;
        self.last_run = Some(RunSummary {
            lines_completed: self.lines_completed,
            keystrokes: self.keystrokes,
        });
        info!(
            lines_completed = self.lines_completed,
            keystrokes = self.keystrokes,
            "time is up"
        );
        self.reinitialize();
    }

    fn reinitialize(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.reset();
        }
        self.queue.reset(&mut self.generator);
        self.input.clear();
        self.prompt.clear();
        self.keystrokes = 0;
        self.lines_completed = 0;
        self.state = SessionState::Typing;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> &Sentence {
        self.queue.target()
    }

    pub fn previews(&self) -> [&Sentence; 2] {
        self.queue.previews()
    }

    pub fn queue(&self) -> &SentenceQueue {
        &self.queue
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        matching::classify(self.queue.target(), &self.input)
    }

    pub fn mistakes(&self) -> usize {
        matching::mistakes(self.queue.target(), &self.input)
    }

    /// Empty unless a restart is awaiting confirmation.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn timer(&self) -> Option<&Countdown> {
        self.timer.as_ref()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.timer.as_ref().map(Countdown::remaining)
    }

    pub fn timer_display(&self) -> Option<String> {
        self.timer.as_ref().map(Countdown::display)
    }

    pub fn has_started(&self) -> bool {
        self.keystrokes > 0
    }

    pub fn keystrokes(&self) -> usize {
        self.keystrokes
    }

    pub fn lines_completed(&self) -> usize {
        self.lines_completed
    }

    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }
}
