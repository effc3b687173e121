//! Reactive "latest matching event" cache.
//!
//! Tracks the newest event of one kind tagging one event id. Initialized by
//! a single scan over the cache, then kept current incrementally as events
//! arrive. An external manager decides disposal through `can_release`.

use parking_lot::Mutex;
use tracing::debug;

use crate::model::Event;
use crate::observables::{ObservableCell, Subscription};
use crate::store::LocalCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

pub struct LatestByKindWithETag {
    kind: u32,
    etag: String,
    latest: ObservableCell<Option<Event>>,
    state: Mutex<InitState>,
}

impl LatestByKindWithETag {
    pub fn new(kind: u32, etag: impl Into<String>) -> Self {
        LatestByKindWithETag {
            kind,
            etag: etag.into(),
            latest: ObservableCell::new(None),
            state: Mutex::new(InitState::Uninitialized),
        }
    }

    pub fn kind(&self) -> u32 {
        self.kind
    }

    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub fn latest(&self) -> Option<Event> {
        self.latest.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<Event>) + Send + Sync + 'static,
    {
        self.latest.subscribe(callback)
    }

    /// True when nobody observes the value anymore; the owning registry may
    /// then drop this instance. It never evicts itself.
    pub fn can_release(&self) -> bool {
        self.latest.observer_count() == 0
    }

    fn matches(&self, event: &Event) -> bool {
        event.kind == self.kind && event.is_tagged_event(&self.etag)
    }

    /// Incremental update: adopt `event` when it matches and is newer than
    /// the current value. The compare-and-publish is atomic, so concurrent
    /// callers and readers always agree on a single winner.
    pub fn update_if_matches(&self, event: &Event) {
        if !self.matches(event) {
            return;
        }
        self.latest.update_if(|current| match current {
            Some(cur) if !event.is_newer_than(cur) => None,
            _ => Some(Some(event.clone())),
        });
    }

    /// One scan over the cache selecting the newest matching event. Runs at
    /// most once per instance; later calls return immediately. Events that
    /// arrive concurrently go through `update_if_matches`, which uses the
    /// same ordering, so init can never roll the value backwards.
    pub async fn init(&self, cache: &LocalCache) {
        {
            let mut state = self.state.lock();
            if *state != InitState::Uninitialized {
                return;
            }
            *state = InitState::Initializing;
        }

        let best = cache
            .scan(|note| note.event.as_ref().is_some_and(|e| self.matches(e)))
            .into_iter()
            .filter_map(|note| note.event)
            .max_by(|a, b| a.cmp_created(b));

        if let Some(event) = best {
            debug!(kind = self.kind, etag = %self.etag, id = %event.id, "latest observable initialized");
            self.update_if_matches(&event);
        }

        *self.state.lock() = InitState::Ready;
    }
}
