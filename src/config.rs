use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::sentence::{
    GeneratorConfig, DEFAULT_MAX_REDRAWS, DEFAULT_REPETITION_WINDOW, DEFAULT_SENTENCE_LENGTH,
};
use crate::session::SessionConfig;
use crate::timer::TimerConfig;
use crate::typing_policy::CompletionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sentence_length: usize,
    pub repetition_window: usize,
    /// `None` disables the countdown
    pub timer_secs: Option<u64>,
    pub tick_ms: u64,
    pub restart_prompt: bool,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sentence_length: DEFAULT_SENTENCE_LENGTH,
            repetition_window: DEFAULT_REPETITION_WINDOW,
            timer_secs: Some(5),
            tick_ms: 1000,
            restart_prompt: true,
            strict: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.sentence_length == 0 {
            return Err(Error::Config(
                "sentence_length must be at least 1".to_string(),
            ));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be at least 1".to_string()));
        }
        if self.timer_secs == Some(0) {
            return Err(Error::Config(
                "timer_secs must be positive; omit it to disable the timer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        self.validate()?;

        Ok(SessionConfig {
            generator: GeneratorConfig {
                sentence_length: self.sentence_length,
                repetition_window: self.repetition_window,
                max_redraws: DEFAULT_MAX_REDRAWS,
            },
            timer: self.timer_secs.map(|secs| TimerConfig {
                total: Duration::from_secs(secs),
                interval: self.tick_interval(),
            }),
            restart_prompt: self.restart_prompt,
            completion: CompletionPolicy::from_strict(self.strict),
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
