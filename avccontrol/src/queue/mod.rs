//! Track queues consumed by the control loop.
//!
//! A queue is an ordered, append-only sequence of [`QueueItem`]s plus a
//! zero-based cursor:
//!   - the cursor lives in `[0, len]`, `len` meaning "exhausted",
//!   - `current()` is the item under the cursor,
//!   - `skip()` moves the cursor forward by at most one and never wraps,
//!   - `clear()` empties the queue and resets the cursor.
//!
//! The reconciliation engine only ever moves the cursor forward. Queues are
//! not synchronized themselves: the loop shares them as a [`SharedQueue`]
//! and holds the lock for a whole tick.
//!
//! Two strategies are provided:
//!   - [`TrackList`], plain play order,
//!   - [`ShuffledTrackList`], where appended items land at a random place
//!     among the items not played yet.

mod item;
mod shuffle;
mod track_list;

use std::sync::{Arc, Mutex};

pub use item::{MUSIC_TRACK_CLASS, QueueItem, Resource};
pub use shuffle::ShuffledTrackList;
pub use track_list::TrackList;

/// Queue abstraction used by the reconciliation engine.
///
/// Implementors provide the four primitives and [`TrackQueue::items`]; the
/// read-only helpers are derived from them.
pub trait TrackQueue: Send {
    /// Item under the cursor, `None` when exhausted.
    fn current(&self) -> Option<QueueItem>;

    /// Advances the cursor by at most one and returns the new current item.
    /// Once exhausted, keeps returning `None`.
    fn skip(&mut self) -> Option<QueueItem>;

    fn append(&mut self, item: QueueItem);

    fn clear(&mut self);

    /// All items in play order.
    fn items(&self) -> &[QueueItem];

    /// Cursor position, in `[0, len]`.
    fn cursor(&self) -> usize;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn is_exhausted(&self) -> bool {
        self.cursor() >= self.len()
    }

    /// Current item and everything after it.
    fn upcoming(&self) -> Vec<QueueItem> {
        let items = self.items();
        items[self.cursor().min(items.len())..].to_vec()
    }

    /// Items already played or skipped.
    fn history(&self) -> Vec<QueueItem> {
        let items = self.items();
        items[..self.cursor().min(items.len())].to_vec()
    }

    fn peek_next(&self) -> Option<QueueItem> {
        self.items().get(self.cursor() + 1).cloned()
    }
}

/// A queue shared between operator commands and the control loop.
pub type SharedQueue = Arc<Mutex<dyn TrackQueue>>;

pub fn shared_queue<Q: TrackQueue + 'static>(queue: Q) -> SharedQueue {
    Arc::new(Mutex::new(queue))
}
