use crate::QueryKey;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a consumer sees for one query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryState {
    /// First fetch still in flight.
    Pending,
    Ready(Value),
    Failed(String),
}

#[derive(Debug)]
struct Entry {
    state: QueryState,
    stale: bool,
}

/// Query results keyed by [`QueryKey`]. Responses are stored in the order
/// they land, so the last one wins.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.entries().get(key).map(|entry| entry.state.clone())
    }

    /// Cached data that has not been invalidated since it landed.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        match self.entries().get(key) {
            Some(Entry {
                state: QueryState::Ready(value),
                stale: false,
            }) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|entry| entry.stale)
    }

    /// Marks a fetch as started. Ready data stays visible while it refetches.
    pub fn begin(&self, key: &QueryKey) {
        let mut entries = self.entries();
        let entry = entries.entry(key.clone()).or_insert(Entry {
            state: QueryState::Pending,
            stale: false,
        });
        if !matches!(entry.state, QueryState::Ready(_)) {
            entry.state = QueryState::Pending;
        }
    }

    pub fn resolve(&self, key: &QueryKey, outcome: Result<Value, String>) {
        let state = match outcome {
            Ok(value) => QueryState::Ready(value),
            Err(message) => QueryState::Failed(message),
        };
        self.entries()
            .insert(key.clone(), Entry { state, stale: false });
    }

    /// Marks every key under `prefix` stale and returns them.
    pub fn invalidate(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        let mut out = Vec::new();
        for (key, entry) in self.entries().iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                out.push(key.clone());
            }
        }
        out
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
