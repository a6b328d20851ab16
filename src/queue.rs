use crate::sentence::{Sentence, SentenceGenerator};
use rand::Rng;
use tracing::debug;

/// The line being typed plus two preview lines.
///
/// A queue can only be built through [`SentenceQueue::new`], so all three
/// slots are populated for its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceQueue {
    target: Sentence,
    next: Sentence,
    next_next: Sentence,
}

impl SentenceQueue {
    pub fn new<R: Rng>(generator: &mut SentenceGenerator<R>) -> Self {
        let [target, next, next_next] = generator.generate_batch();
        Self {
            target,
            next,
            next_next,
        }
    }

    /// Rotate after the target has been completed and refill the last slot.
    pub fn advance<R: Rng>(&mut self, generator: &mut SentenceGenerator<R>) -> &Sentence {
        let fresh = generator.generate();
        let next_next = std::mem::replace(&mut self.next_next, fresh);
        let next = std::mem::replace(&mut self.next, next_next);
        self.target = next;
        debug!(target_line = %self.target, "queue advanced");
        &self.target
    }

    /// Replace all three slots with fresh sentences.
    pub fn reset<R: Rng>(&mut self, generator: &mut SentenceGenerator<R>) {
        *self = Self::new(generator);
    }

    pub fn target(&self) -> &Sentence {
        &self.target
    }

    pub fn next(&self) -> &Sentence {
        &self.next
    }

    pub fn next_next(&self) -> &Sentence {
        &self.next_next
    }

    pub fn previews(&self) -> [&Sentence; 2] {
        [&self.next, &self.next_next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Corpus;
    use crate::sentence::GeneratorConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn generator(seed: u64) -> SentenceGenerator<StdRng> {
        SentenceGenerator::with_rng(
            Arc::new(Corpus::embedded().unwrap()),
            GeneratorConfig::default(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_new_fills_all_slots() {
        let mut generator = generator(1);
        let queue = SentenceQueue::new(&mut generator);

        for sentence in [queue.target(), queue.next(), queue.next_next()] {
            assert_eq!(sentence.word_count(), 12);
        }
    }

    #[test]
    fn test_new_takes_one_batch_in_slot_order() {
        let [target, next, next_next] = generator(5).generate_batch();
        let queue = SentenceQueue::new(&mut generator(5));

        assert_eq!(queue.target(), &target);
        assert_eq!(queue.next(), &next);
        assert_eq!(queue.next_next(), &next_next);
    }

    #[test]
    fn test_advance_rotates_slots() {
        let mut generator = generator(2);
        let mut queue = SentenceQueue::new(&mut generator);
        let old_next = queue.next().clone();
        let old_next_next = queue.next_next().clone();

        let new_target = queue.advance(&mut generator).clone();

        assert_eq!(new_target, old_next);
        assert_eq!(queue.target(), &old_next);
        assert_eq!(queue.next(), &old_next_next);
        assert_eq!(queue.next_next().word_count(), 12);
    }

    #[test]
    fn test_advance_repeatedly() {
        let mut generator = generator(3);
        let mut queue = SentenceQueue::new(&mut generator);

        for _ in 0..10 {
            let expected = queue.next().clone();
            queue.advance(&mut generator);
            assert_eq!(queue.target(), &expected);
        }
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut generator = generator(4);
        let mut queue = SentenceQueue::new(&mut generator);
        let before = queue.clone();

        queue.reset(&mut generator);

        assert_ne!(queue, before);
        assert_eq!(queue.previews().len(), 2);
    }
}
