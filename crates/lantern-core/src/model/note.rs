use std::hash::{Hash, Hasher};

use crate::model::Event;

/// A cached note: an event id plus, once loaded, the event itself.
///
/// Placeholders with `event: None` exist so that "is this loaded yet" can be
/// answered for ids learned from tags before the event arrives.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: String,
    pub event: Option<Event>,
}

impl Note {
    pub fn new(id: impl Into<String>) -> Self {
        Note {
            id: id.into(),
            event: None,
        }
    }

    pub fn loaded(event: Event) -> Self {
        Note {
            id: event.id.clone(),
            event: Some(event),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.event.is_some()
    }

    pub fn created_at(&self) -> Option<u64> {
        self.event.as_ref().map(|e| e.created_at)
    }

    pub fn author(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.pubkey.as_str())
    }
}

// Identity is the event id; feeds rely on set semantics over it.
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
