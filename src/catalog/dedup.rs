use std::collections::HashSet;

/// Tracks which product ids have already been emitted in one crawl run
///
/// Sites frequently re-list the same item on overlapping listing pages (or in
/// more than one category). The first occurrence wins; every later one is
/// dropped. An instance is owned by a single run and never shared between runs.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<i64>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` and returns true if this is its first occurrence
    pub fn admit(&mut self, id: i64) -> bool {
        self.seen.insert(id)
    }

    /// Returns true if `id` was already admitted
    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    /// Number of distinct ids admitted so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
