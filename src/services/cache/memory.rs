use crate::traits::CacheTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct Entries {
    replies: HashMap<String, String>,
    order: VecDeque<String>, // insertion order, oldest first
}

pub struct InMemoryCache {
    entries: RwLock<Entries>,
    max_entries: Option<usize>,
}

impl InMemoryCache {
    /// `max_entries == 0` keeps every reply.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_entries: (max_entries > 0).then_some(max_entries),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .replies
            .len()
    }
}

impl CacheTrait for InMemoryCache {
    fn get(&self, utterance: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.replies.get(utterance).cloned()
    }

    fn insert(&self, utterance: &str, reply: String) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.replies.insert(utterance.to_string(), reply).is_some() {
            return;
        }
        entries.order.push_back(utterance.to_string());

        if let Some(max) = self.max_entries {
            while entries.order.len() > max {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.replies.remove(&oldest);
                }
            }
        }
    }
}
