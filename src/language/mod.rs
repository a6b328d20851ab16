pub mod core;

// Re-export the main types for convenience
pub use self::core::{Corpus, EMBEDDED_CORPUS};
