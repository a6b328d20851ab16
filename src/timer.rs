use std::time::Duration;

/// Reference countdown length
pub const DEFAULT_TOTAL: Duration = Duration::from_secs(5);
/// Reference tick interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub total: Duration,
    pub interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL,
            interval: DEFAULT_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Time left after the tick
    Tick(Duration),
    Timeout,
}

/// Countdown driven by externally delivered ticks.
///
/// The countdown never reads the wall clock; whoever delivers ticks decides
/// how much time has elapsed.
#[derive(Debug, Clone)]
pub struct Countdown {
    config: TimerConfig,
    remaining: Duration,
    running: bool,
}

impl Countdown {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            remaining: config.total,
            running: false,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and restore the full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.config.total;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Consume `elapsed` time. Emits `Timeout` once, when the remaining time
    /// reaches zero, and stops; ticks while stopped are ignored.
    pub fn on_tick(&mut self, elapsed: Duration) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            Some(TimerEvent::Timeout)
        } else {
            Some(TimerEvent::Tick(self.remaining))
        }
    }

    pub fn display(&self) -> String {
        format_remaining(self.remaining)
    }
}

/// "5s", "1m30s", "500ms"
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let millis = remaining.subsec_millis();

    if secs == 0 && millis > 0 {
        return format!("{millis}ms");
    }

    let (mins, secs) = (secs / 60, secs % 60);
    let frac = if millis > 0 {
        format!(".{}", millis / 100)
    } else {
        String::new()
    };

    if mins > 0 {
        format!("{mins}m{secs}{frac}s")
    } else {
        format!("{secs}{frac}s")
    }
}
