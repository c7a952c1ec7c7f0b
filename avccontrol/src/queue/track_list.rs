use super::{QueueItem, TrackQueue};

/// Linear queue: items are played in the order they were appended.
#[derive(Clone, Debug, Default)]
pub struct TrackList {
    items: Vec<QueueItem>,
    cursor: usize,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<QueueItem>) -> Self {
        Self { items, cursor: 0 }
    }
}

impl TrackQueue for TrackList {
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
        self.items.push(item);
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
