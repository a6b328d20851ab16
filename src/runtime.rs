use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::KeyAction;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum TermEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TermEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(TermEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(TermEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "terminal event reader stopped");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TermEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TermEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that merges terminal events with ticks on a fixed schedule.
///
/// Ticks are due every `ticker.interval()` regardless of how many key events
/// arrive in between, so steady typing cannot starve the countdown.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    pub fn interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Restart the tick schedule from now, so the next tick is a full interval away.
    /// Call when a countdown starts mid-interval.
    pub fn resync(&mut self) {
        self.next_tick = Instant::now() + self.ticker.interval();
    }

    /// Blocks until the next event or the next tick deadline, whichever comes first
    pub fn step(&mut self) -> TermEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.fire_tick(now);
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.fire_tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                // nothing more will arrive; keep the tick cadence
                let now = Instant::now();
                if now < self.next_tick {
                    std::thread::sleep(self.next_tick - now);
                }
                self.fire_tick(Instant::now())
            }
        }
    }

    fn fire_tick(&mut self, now: Instant) -> TermEvent {
        self.next_tick += self.ticker.interval();
        if self.next_tick < now {
            // fell behind (e.g. suspended); resynchronise instead of bursting
            self.next_tick = now + self.ticker.interval();
        }
        TermEvent::Tick
    }
}

/// Map a terminal key to the engine's key vocabulary.
pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Tab => Some(KeyAction::RestartRequest),
        KeyCode::Enter => Some(KeyAction::Confirm),
        KeyCode::Backspace => Some(KeyAction::Backspace),
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
        KeyCode::Char(c) => Some(KeyAction::Char(c)),
        _ => None,
    }
}
