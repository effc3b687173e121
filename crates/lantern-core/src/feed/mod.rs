//! Feed filters: pure derivations from the cache to display-ordered lists.
//!
//! Two shapes. A plain [`FeedFilter`] recomputes from scratch. An
//! [`AdditiveFeedFilter`] can additionally re-filter a delta of freshly
//! arrived entities so callers can merge it into an already-sorted feed;
//! its membership decisions must agree with the full rebuild, which the
//! tests pin down.

pub mod channel;
pub mod chatroom;
pub mod follows;

use std::collections::HashSet;
use std::hash::Hash;

use crate::model::Note;
use crate::store::LocalCache;

pub use channel::ChannelFeedFilter;
pub use chatroom::ChatroomFeedFilter;
pub use follows::UserProfileFollowsFeedFilter;

pub trait FeedFilter<T> {
    /// Stable identity for memoization; equal configurations yield equal
    /// keys.
    fn feed_key(&self) -> String;

    /// Full rebuild against the cache.
    fn feed(&self, cache: &LocalCache) -> Vec<T>;
}

pub trait AdditiveFeedFilter<T: Eq + Hash>: FeedFilter<T> {
    /// Keep only the delta entities that belong in this feed. Must make the
    /// same membership decision as [`FeedFilter::feed`].
    fn apply_filter(&self, cache: &LocalCache, delta: &HashSet<T>) -> HashSet<T>;

    /// Order a membership set for display.
    fn sort(&self, set: HashSet<T>) -> Vec<T>;
}

/// Chat display order: ascending `(created_at, id)` then reversed, i.e.
/// newest first with descending-id tie-break.
pub fn sort_chat_display(set: HashSet<Note>) -> Vec<Note> {
    let mut notes: Vec<Note> = set.into_iter().collect();
    notes.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id.cmp(&b.id))
    });
    notes.reverse();
    notes
}
