use crate::error::{Error, Result};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Name of the word list bundled with the binary
pub const EMBEDDED_CORPUS: &str = "common";

/// Fixed vocabulary sampled when building sentences.
///
/// The word list is read-only after construction; share it behind an `Arc`
/// rather than cloning it per session.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Corpus {
    name: String,
    #[allow(dead_code)]
    size: u32,
    words: Vec<String>,
}

impl Corpus {
    /// Load the word list that ships inside the binary.
    pub fn embedded() -> Result<Self> {
        read_corpus_from_file(&format!("{EMBEDDED_CORPUS}.json"))
    }

    /// Build a corpus from an explicit word list.
    pub fn from_words<I, S>(name: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        Self {
            name: name.to_string(),
            size: words.len() as u32,
            words,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at `index`. Callers sample within `0..size()`; anything else is a bug.
    pub fn word_at(&self, index: usize) -> &str {
        &self.words[index]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

fn read_corpus_from_file(file_name: &str) -> Result<Corpus> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| Error::Corpus(format!("word list {file_name} not found")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| Error::Corpus(format!("word list {file_name} is not valid UTF-8")))?;

    let corpus: Corpus = from_str(file_as_str)?;
    if corpus.is_empty() {
        return Err(Error::Corpus(format!("word list {file_name} is empty")));
    }

    Ok(corpus)
}
