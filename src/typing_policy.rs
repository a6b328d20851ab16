use serde::{Deserialize, Serialize};

/// Decides when a fully typed line counts as finished.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Line length reached and the final character matches; earlier
    /// mistakes do not block advancing.
    #[default]
    LastChar,
    /// Every position must match.
    Strict,
}

impl CompletionPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::LastChar
        }
    }

    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}
