// Library surface for the binary, headless integration tests and reuse.
// Terminal setup and the CLI stay in main.rs.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod language;
pub mod matching;
pub mod queue;
pub mod runtime;
pub mod sentence;
pub mod session;
pub mod timer;
pub mod typing_policy;
pub mod ui;

pub use error::{Error, Result};
pub use session::{Control, KeyAction, Session, SessionConfig, SessionEvent, SessionState};
