use crate::error::{Error, Result};
use crate::language::Corpus;
use itertools::Itertools;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Words per generated line
pub const DEFAULT_SENTENCE_LENGTH: usize = 12;
/// Minimum number of words between two placements of the same word
pub const DEFAULT_REPETITION_WINDOW: usize = 5;
/// Rejected draws tolerated for one position before the window is relaxed
pub const DEFAULT_MAX_REDRAWS: usize = 1000;

/// An immutable line of words joined by single spaces, with one trailing space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentence {
    text: String,
    chars: Vec<char>,
}

impl Sentence {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = words.into_iter().map(|w| w.as_ref().to_owned()).join(" ");
        text.push(' ');
        Self::from(text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Code points of the line; all matching happens on these.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn last_char(&self) -> Option<char> {
        self.chars.last().copied()
    }
}

impl From<String> for Sentence {
    fn from(text: String) -> Self {
        let chars = text.chars().collect();
        Self { text, chars }
    }
}

impl From<&str> for Sentence {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Configuration for sentence generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub sentence_length: usize,
    pub repetition_window: usize,
    pub max_redraws: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sentence_length: DEFAULT_SENTENCE_LENGTH,
            repetition_window: DEFAULT_REPETITION_WINDOW,
            max_redraws: DEFAULT_MAX_REDRAWS,
        }
    }
}

/// Builds sentences from a corpus, keeping repeated words apart.
#[derive(Debug)]
pub struct SentenceGenerator<R: Rng = ThreadRng> {
    corpus: Arc<Corpus>,
    config: GeneratorConfig,
    rng: R,
}

impl SentenceGenerator<ThreadRng> {
    pub fn new(corpus: Arc<Corpus>, config: GeneratorConfig) -> Result<Self> {
        Self::with_rng(corpus, config, rand::thread_rng())
    }
}

impl<R: Rng> SentenceGenerator<R> {
    /// Use a caller-provided random source (seeded in tests).
    pub fn with_rng(corpus: Arc<Corpus>, config: GeneratorConfig, rng: R) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::Config(format!(
                "corpus {} has no words to sample from",
                corpus.name()
            )));
        }
        if config.sentence_length == 0 {
            return Err(Error::Config(
                "sentence length must be at least one word".to_string(),
            ));
        }
        if config.max_redraws == 0 {
            return Err(Error::Config(
                "max redraws must be at least one".to_string(),
            ));
        }

        Ok(Self {
            corpus,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Generate one sentence of `config.sentence_length` words.
    pub fn generate(&mut self) -> Sentence {
        let length = self.config.sentence_length;
        let mut words: Vec<usize> = Vec::with_capacity(length);
        // word index -> position it was last placed at
        let mut last_used: HashMap<usize, usize> = HashMap::new();

        while words.len() < length {
            let placed = words.len();
            let index = self.draw(placed, &last_used);
            last_used.insert(index, placed);
            words.push(index);
        }

        Sentence::from_words(words.into_iter().map(|i| self.corpus.word_at(i)))
    }

    /// Generate `N` independent sentences.
    pub fn generate_batch<const N: usize>(&mut self) -> [Sentence; N] {
        std::array::from_fn(|_| self.generate())
    }

    fn draw(&mut self, placed: usize, last_used: &HashMap<usize, usize>) -> usize {
        for _ in 0..self.config.max_redraws {
            let index = self.rng.gen_range(0..self.corpus.size());
            if is_eligible(last_used.get(&index).copied(), placed, self.config.repetition_window)
            {
                return index;
            }
        }

        let fallback = least_recently_used(self.corpus.size(), last_used);
        debug!(
            position = placed,
            word = self.corpus.word_at(fallback),
            "repetition window relaxed after {} redraws",
            self.config.max_redraws
        );
        fallback
    }
}

/// A word may be placed if it is unused so far, or its last use lies more
/// than `window` words behind the position being filled.
fn is_eligible(last: Option<usize>, placed: usize, window: usize) -> bool {
    match last {
        None => true,
        Some(last) => placed - (last + 1) > window,
    }
}

/// Never-placed words first, then the one placed longest ago.
fn least_recently_used(size: usize, last_used: &HashMap<usize, usize>) -> usize {
    (0..size)
        .min_by_key(|i| last_used.get(i).map_or((0, 0), |&pos| (1, pos)))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(corpus: Corpus, config: GeneratorConfig, seed: u64) -> SentenceGenerator<StdRng> {
        SentenceGenerator::with_rng(Arc::new(corpus), config, StdRng::seed_from_u64(seed))
            .unwrap()
    }

    fn embedded(seed: u64) -> SentenceGenerator<StdRng> {
        seeded(Corpus::embedded().unwrap(), GeneratorConfig::default(), seed)
    }

    #[test]
    fn test_sentence_from_words() {
        let sentence = Sentence::from_words(["the", "cat"]);

        assert_eq!(sentence.as_str(), "the cat ");
        assert_eq!(sentence.char_count(), 8);
        assert_eq!(sentence.word_count(), 2);
        assert_eq!(sentence.last_char(), Some(' '));
    }

    #[test]
    fn test_sentence_counts_code_points() {
        let sentence = Sentence::from("héllo wörld ");

        assert_eq!(sentence.char_count(), 12);
        assert_eq!(sentence.chars()[1], 'é');
        assert!(sentence.as_str().len() > sentence.char_count());
    }

    #[test]
    fn test_generate_has_twelve_words_and_one_trailing_space() {
        let mut generator = embedded(7);

        for _ in 0..50 {
            let sentence = generator.generate();
            let text = sentence.as_str();

            assert_eq!(sentence.word_count(), 12);
            assert!(text.ends_with(' '));
            assert!(!text.ends_with("  "));
            assert!(!text.starts_with(' '));
            assert!(!text.contains("  "));
        }
    }

    #[test]
    fn test_generated_words_come_from_corpus() {
        let mut generator = embedded(11);
        let sentence = generator.generate();

        for word in sentence.as_str().split_whitespace() {
            assert!(generator.corpus().words().iter().any(|w| w == word));
        }
    }

    #[test]
    fn test_no_repeat_within_window() {
        let config = GeneratorConfig {
            sentence_length: 40,
            ..GeneratorConfig::default()
        };
        let corpus = Corpus::from_words("small", ["a", "b", "c", "d", "e", "f", "g", "h"]);
        let mut generator = seeded(corpus, config, 3);

        for _ in 0..20 {
            let sentence = generator.generate();
            let words: Vec<&str> = sentence.as_str().split_whitespace().collect();
            assert_eq!(words.len(), 40);

            for window in words.windows(6) {
                let unique: std::collections::HashSet<_> = window.iter().collect();
                assert_eq!(unique.len(), window.len(), "repeat inside {window:?}");
            }
        }
    }

    #[test]
    fn test_words_may_recur_after_window() {
        // Seven words and a window of five leaves exactly one legal word per
        // position once the first seven are placed, so the line is periodic.
        let config = GeneratorConfig {
            sentence_length: 21,
            ..GeneratorConfig::default()
        };
        let corpus = Corpus::from_words("seven", ["a", "b", "c", "d", "e", "f", "g"]);
        let mut generator = seeded(corpus, config, 5);

        let sentence = generator.generate();
        let words: Vec<&str> = sentence.as_str().split_whitespace().collect();

        for i in 7..words.len() {
            assert_eq!(words[i], words[i - 7]);
        }
    }

    #[test]
    fn test_relaxes_window_instead_of_hanging() {
        let config = GeneratorConfig {
            sentence_length: 12,
            repetition_window: 5,
            max_redraws: 50,
        };
        let corpus = Corpus::from_words("pair", ["yes", "no"]);
        let mut generator = seeded(corpus, config, 1);

        let sentence = generator.generate();

        assert_eq!(sentence.word_count(), 12);
        // least recently used fallback alternates the two words
        let words: Vec<&str> = sentence.as_str().split_whitespace().collect();
        for pair in words.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_single_word_corpus_still_terminates() {
        let config = GeneratorConfig {
            sentence_length: 4,
            repetition_window: 5,
            max_redraws: 3,
        };
        let mut generator = seeded(Corpus::from_words("one", ["go"]), config, 9);

        assert_eq!(generator.generate().as_str(), "go go go go ");
    }

    #[test]
    fn test_generate_batch() {
        let mut generator = embedded(13);

        assert_eq!(generator.generate_batch::<3>().len(), 3);
        assert_eq!(generator.generate_batch::<1>().len(), 1);
        assert!(generator.generate_batch::<0>().is_empty());
    }

    #[test]
    fn test_same_seed_same_sentences() {
        let mut first = embedded(42);
        let mut second = embedded(42);

        assert_eq!(first.generate_batch::<3>(), second.generate_batch::<3>());
    }

    #[test]
    fn test_rejects_empty_corpus() {
        let result = SentenceGenerator::new(
            Arc::new(Corpus::from_words("empty", Vec::<String>::new())),
            GeneratorConfig::default(),
        );
        assert_matches!(result, Err(Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_length_and_zero_redraws() {
        let corpus = Arc::new(Corpus::from_words("tiny", ["a"]));

        let zero_len = GeneratorConfig {
            sentence_length: 0,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            SentenceGenerator::new(corpus.clone(), zero_len),
            Err(Error::Config(_))
        );

        let zero_redraws = GeneratorConfig {
            max_redraws: 0,
            ..GeneratorConfig::default()
        };
        assert_matches!(
            SentenceGenerator::new(corpus, zero_redraws),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_is_eligible() {
        assert!(is_eligible(None, 0, 5));
        // placed at 0, candidate positions 1..=6 are too close
        for placed in 1..=6 {
            assert!(!is_eligible(Some(0), placed, 5));
        }
        assert!(is_eligible(Some(0), 7, 5));
    }

    #[test]
    fn test_least_recently_used_prefers_unused() {
        let mut last_used = HashMap::new();
        last_used.insert(0, 3);
        last_used.insert(2, 1);

        assert_eq!(least_recently_used(3, &last_used), 1);

        last_used.insert(1, 4);
        assert_eq!(least_recently_used(3, &last_used), 2);
    }
}
