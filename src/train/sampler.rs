use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded generator when a seed is configured, entropy otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Endless cursor over sample indices for step-mode training.
///
/// Each pass visits every index once; when a pass is exhausted the order is
/// reshuffled (if enabled) and the cursor rewinds.
#[derive(Debug, Clone)]
pub struct SampleQueue {
    order: Vec<usize>,
    cursor: usize,
    shuffle: bool,
    rng: StdRng,
}

impl SampleQueue {
    pub fn new(len: usize, shuffle: bool, seed: Option<u64>) -> SampleQueue {
        let mut queue = SampleQueue {
            order: (0..len).collect(),
            cursor: 0,
            shuffle,
            rng: seeded_rng(seed),
        };
        queue.reshuffle();
        queue
    }

    fn reshuffle(&mut self) {
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
    }

    /// Next sample index, plus whether it was the last of the current pass.
    /// Returns `None` only for an empty queue.
    pub fn next_index(&mut self) -> Option<(usize, bool)> {
        let idx = *self.order.get(self.cursor)?;
        self.cursor += 1;
        let exhausted = self.cursor == self.order.len();
        if exhausted {
            self.cursor = 0;
            self.reshuffle();
        }
        Some((idx, exhausted))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
