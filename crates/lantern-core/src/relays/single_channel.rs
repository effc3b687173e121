//! Relay subscription for individually watched channels.
//!
//! The UI adds a channel id when a channel view opens and removes it when
//! the view closes. Every mutation recomputes the published filter set
//! immediately: one metadata-watch filter over the whole watch set, one
//! backfill filter for channels whose defining event is still missing, and
//! one filter per live activity whose stream info has not arrived. The
//! transport observes the published cell and re-issues its REQ.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::constants::kinds;
use crate::relays::{FeedType, TypedFilter, WireFilter, COMMON_FEED_TYPES};
use crate::store::LocalCache;

pub struct SingleChannelSource {
    cache: Arc<LocalCache>,
    watch: Mutex<BTreeSet<String>>,
    subscription_id: String,
    filters: crate::observables::ObservableCell<Option<Vec<TypedFilter>>>,
}

impl SingleChannelSource {
    pub fn new(cache: Arc<LocalCache>) -> Self {
        SingleChannelSource {
            cache,
            watch: Mutex::new(BTreeSet::new()),
            subscription_id: Uuid::new_v4().to_string(),
            filters: crate::observables::ObservableCell::new(None),
        }
    }

    /// Stable id the transport uses for this source's REQ.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Currently published filter set; `None` when nothing needs watching.
    pub fn filters(&self) -> Option<Vec<TypedFilter>> {
        self.filters.get()
    }

    pub fn subscribe_filters<F>(&self, callback: F) -> crate::observables::Subscription
    where
        F: Fn(&Option<Vec<TypedFilter>>) + Send + Sync + 'static,
    {
        self.filters.subscribe(callback)
    }

    pub fn add(&self, channel_id: impl Into<String>) {
        self.watch.lock().insert(channel_id.into());
        self.invalidate();
    }

    pub fn remove(&self, channel_id: &str) {
        self.watch.lock().remove(channel_id);
        self.invalidate();
    }

    pub fn watched(&self) -> BTreeSet<String> {
        self.watch.lock().clone()
    }

    /// Recompute and publish the filter set. Idempotent: with no watch-set
    /// or cache mutation in between, two runs publish equal sets. Also
    /// called by the client core when ingested events may have changed
    /// backfill state.
    pub fn invalidate(&self) {
        let watch = self.watch.lock().clone();

        let mut filters = Vec::new();
        if let Some(metadata) = self.metadata_filter(&watch) {
            filters.push(metadata);
        }
        if let Some(missing) = self.missing_channel_filter(&watch) {
            filters.push(missing);
        }
        filters.extend(self.missing_stream_filters(&watch));

        debug!(
            watched = watch.len(),
            filters = filters.len(),
            "single-channel filters recomputed"
        );
        self.filters
            .publish(if filters.is_empty() { None } else { Some(filters) });
    }

    /// Watch for metadata updates tagging any watched channel. `None` on an
    /// empty watch set. Narrowed with `since` when the cache already holds
    /// matching events (minus one second, so same-second events still
    /// arrive).
    fn metadata_filter(&self, watch: &BTreeSet<String>) -> Option<TypedFilter> {
        if watch.is_empty() {
            return None;
        }

        let mut filter = WireFilter::new()
            .kind(kinds::CHANNEL_METADATA)
            .tag("e", watch.iter().cloned());

        if let Some(latest) = self.latest_metadata_timestamp(watch) {
            filter = filter.since(latest.saturating_sub(1));
        }

        Some(TypedFilter::new([FeedType::PublicChats], filter))
    }

    fn latest_metadata_timestamp(&self, watch: &BTreeSet<String>) -> Option<u64> {
        self.cache
            .scan(|note| {
                note.event.as_ref().is_some_and(|e| {
                    e.kind == kinds::CHANNEL_METADATA
                        && watch.iter().any(|id| e.is_tagged_event(id))
                })
            })
            .into_iter()
            .filter_map(|note| note.created_at())
            .max()
    }

    /// Backfill the defining event of watched public chats that have no
    /// content yet. Checking "is it loaded" get-or-creates the channel
    /// entity; that side effect is intentional.
    fn missing_channel_filter(&self, watch: &BTreeSet<String>) -> Option<TypedFilter> {
        let missing: BTreeSet<String> = watch
            .iter()
            .filter_map(|id| self.cache.check_get_or_create_channel(id))
            .filter_map(|channel| {
                channel
                    .as_public_chat()
                    .filter(|chat| chat.notes.is_empty())
                    .map(|chat| chat.id.clone())
            })
            .collect();

        if missing.is_empty() {
            return None;
        }

        Some(TypedFilter::new(
            COMMON_FEED_TYPES,
            WireFilter::new().kind(kinds::CHANNEL_CREATE).ids(missing),
        ))
    }

    /// Backfill stream info for watched live activities that lack it. One
    /// filter per activity: each is keyed by its own kind + author + `d`
    /// discriminator, and merging them would widen the query into false
    /// positives.
    fn missing_stream_filters(&self, watch: &BTreeSet<String>) -> Vec<TypedFilter> {
        watch
            .iter()
            .filter_map(|id| self.cache.check_get_or_create_channel(id))
            .filter_map(|channel| channel.as_live_activity().cloned())
            .filter(|live| live.info.is_none())
            .map(|live| {
                TypedFilter::new(
                    COMMON_FEED_TYPES,
                    WireFilter::new()
                        .kind(live.address.kind)
                        .authors([live.address.pubkey.clone()])
                        .tag("d", [live.address.d_tag.clone()]),
                )
            })
            .collect()
    }
}
