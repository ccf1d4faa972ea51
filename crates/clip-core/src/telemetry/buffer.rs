// ── Bounded log buffer ──

use std::collections::VecDeque;
use std::sync::Arc;

use clip_api::LogEvent;

/// Default number of retained log entries.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Ordered, capacity-bounded sequence of log entries.
///
/// Length never exceeds the capacity. Both appends and prepends evict
/// from the front (oldest first), so the retained entries are always a
/// suffix of everything inserted, in insertion order.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<Arc<LogEvent>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// A buffer holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one entry, evicting the oldest if full.
    pub fn push(&mut self, event: Arc<LogEvent>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Insert `history` ahead of everything already buffered, then trim
    /// the front back down to capacity.
    pub fn prepend(&mut self, history: impl IntoIterator<Item = Arc<LogEvent>>) {
        let history: Vec<_> = history.into_iter().collect();
        for event in history.into_iter().rev() {
            self.entries.push_front(event);
        }
        let excess = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..excess);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LogEvent>> {
        self.entries.iter()
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<LogEvent>> {
        self.entries.iter().cloned().collect()
    }
}
