use super::{QueueItem, TrackQueue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Queue where each appended item is inserted at a uniformly random
/// position among the items not played yet. The current item and the
/// history never move.
#[derive(Debug)]
pub struct ShuffledTrackList {
    items: Vec<QueueItem>,
    cursor: usize,
    rng: StdRng,
}

impl ShuffledTrackList {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Reproducible order, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            rng,
        }
    }
}

impl Default for ShuffledTrackList {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackQueue for ShuffledTrackList {
    fn current(&self) -> Option<QueueItem> {
        self.items.get(self.cursor).cloned()
    }

    fn skip(&mut self) -> Option<QueueItem> {
        if self.cursor < self.items.len() {
            self.cursor += 1;
        }
        self.current()
    }

    fn append(&mut self, item: QueueItem) {
        let len = self.items.len();
        // the item under the cursor is being played, keep it in place
        let first = if self.cursor < len { self.cursor + 1 } else { len };
        let index = self.rng.random_range(first..=len);
        self.items.insert(index, item);
    }

    fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
    }

    fn items(&self) -> &[QueueItem] {
        &self.items
    }

    fn cursor(&self) -> usize {
        self.cursor
    }
}
