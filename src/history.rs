use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Maximum number of refinements kept for the session.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub instruction: String,
    pub image_url: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(instruction: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self { instruction: instruction.into(), image_url: image_url.into(), recorded_at: Utc::now() }
    }
}

/// Append-only refinement log. When full, the oldest entry is dropped first.
#[derive(Debug, Clone)]
pub struct RefinementHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for RefinementHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinementHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    /// Appends `entry`, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let evicted = if self.entries.len() >= self.capacity { self.entries.pop_front() } else { None };
        self.entries.push_back(entry);
        evicted
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn latest(&self) -> Option<&HistoryEntry> { self.entries.back() }

    /// Instructions, oldest first.
    pub fn instructions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.instruction.as_str()).collect()
    }
}
