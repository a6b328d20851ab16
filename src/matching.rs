use crate::sentence::Sentence;
use crate::typing_policy::CompletionPolicy;

/// Per-position state of the target line
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Nothing typed at this position yet
    Pending,
}

/// Characters typed toward the current target, never longer than it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputBuffer {
    chars: Vec<char>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `c` unless the target is already fully typed. Returns whether
    /// the character was kept.
    pub fn push(&mut self, target: &Sentence, c: char) -> bool {
        if self.chars.len() < target.char_count() {
            self.chars.push(c);
            true
        } else {
            false
        }
    }

    /// Drop the last character. Returns false on an empty buffer.
    pub fn backspace(&mut self) -> bool {
        self.chars.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Index of the next character to type.
    pub fn cursor(&self) -> usize {
        self.chars.len()
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Classify every position of `target` against what has been typed.
pub fn classify(target: &Sentence, input: &InputBuffer) -> Vec<Outcome> {
    target
        .chars()
        .iter()
        .enumerate()
        .map(|(idx, expected)| match input.chars().get(idx) {
            Some(typed) if typed == expected => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
            None => Outcome::Pending,
        })
        .collect()
}

/// Whether the line is finished under `policy`.
pub fn is_complete(target: &Sentence, input: &InputBuffer, policy: CompletionPolicy) -> bool {
    if input.len() != target.char_count() {
        return false;
    }

    match policy {
        CompletionPolicy::LastChar => input.chars().last() == target.chars().last(),
        CompletionPolicy::Strict => input.chars() == target.chars(),
    }
}

/// Number of incorrectly typed positions.
pub fn mistakes(target: &Sentence, input: &InputBuffer) -> usize {
    input
        .chars()
        .iter()
        .zip(target.chars())
        .filter(|(typed, expected)| typed != expected)
        .count()
}
