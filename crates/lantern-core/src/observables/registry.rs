//! Ownership and fan-out for latest-value observables.
//!
//! One registry per client core, constructed at the composition root and
//! passed by reference - no process-wide state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::model::Event;
use crate::observables::LatestByKindWithETag;

#[derive(Default)]
pub struct ObservableRegistry {
    cells: Mutex<HashMap<(u32, String), Arc<LatestByKindWithETag>>>,
}

impl ObservableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the observable for `(kind, etag)`.
    pub fn latest_by_kind_with_etag(&self, kind: u32, etag: &str) -> Arc<LatestByKindWithETag> {
        let mut cells = self.cells.lock();
        cells
            .entry((kind, etag.to_string()))
            .or_insert_with(|| Arc::new(LatestByKindWithETag::new(kind, etag)))
            .clone()
    }

    /// Fan an incoming event out to every registered observable. Each one
    /// applies its own (kind, tag) match.
    pub fn dispatch(&self, event: &Event) {
        let cells: Vec<Arc<LatestByKindWithETag>> =
            self.cells.lock().values().cloned().collect();
        for cell in cells {
            cell.update_if_matches(event);
        }
    }

    /// Drop every observable with zero active observers. Returns how many
    /// were released.
    pub fn prune(&self) -> usize {
        let mut cells = self.cells.lock();
        let before = cells.len();
        cells.retain(|_, cell| !cell.can_release());
        let released = before - cells.len();
        if released > 0 {
            debug!(released, remaining = cells.len(), "pruned latest observables");
        }
        released
    }

    pub fn len(&self) -> usize {
        self.cells.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    fn reaction(target: &str, created_at: u64) -> Event {
        Event {
            id: hex::encode([created_at as u8; 32]),
            pubkey: hex::encode([0xAAu8; 32]),
            created_at,
            kind: 7,
            tags: vec![Tag::new(["e", target])],
            content: String::new(),
            sig: hex::encode([7u8; 64]),
        }
    }

    #[test]
    fn get_or_create_returns_the_same_instance() {
        let registry = ObservableRegistry::new();
        let a = registry.latest_by_kind_with_etag(7, "t1");
        let b = registry.latest_by_kind_with_etag(7, "t1");
        let c = registry.latest_by_kind_with_etag(7, "t2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn dispatch_reaches_the_matching_cell() {
        let registry = ObservableRegistry::new();
        let cell = registry.latest_by_kind_with_etag(7, "t1");
        let other = registry.latest_by_kind_with_etag(7, "t2");

        registry.dispatch(&reaction("t1", 5));
        assert_eq!(cell.latest().unwrap().created_at, 5);
        assert!(other.latest().is_none());
    }

    #[test]
    fn prune_drops_unobserved_cells() {
        let registry = ObservableRegistry::new();
        let watched = registry.latest_by_kind_with_etag(7, "t1");
        let _unwatched = registry.latest_by_kind_with_etag(7, "t2");
        let sub = watched.subscribe(|_| {});

        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.len(), 1);

        drop(sub);
        assert_eq!(registry.prune(), 1);
        assert!(registry.is_empty());
    }
}
