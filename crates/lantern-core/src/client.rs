//! Composition root: one owned instance wiring the cache, the latest-value
//! observables, and the relay data sources. Constructed once by the
//! embedding application and passed by reference; tests build isolated
//! instances.

use std::sync::Arc;

use anyhow::Result;
use tracing::trace;

use crate::constants::kinds;
use crate::model::Event;
use crate::observables::ObservableRegistry;
use crate::relays::SingleChannelSource;
use crate::store::LocalCache;

pub struct ClientCore {
    cache: Arc<LocalCache>,
    observables: ObservableRegistry,
    single_channel: SingleChannelSource,
}

impl Default for ClientCore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientCore {
    pub fn new() -> Self {
        let cache = Arc::new(LocalCache::new());
        let single_channel = SingleChannelSource::new(Arc::clone(&cache));
        ClientCore {
            cache,
            observables: ObservableRegistry::new(),
            single_channel,
        }
    }

    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    pub fn observables(&self) -> &ObservableRegistry {
        &self.observables
    }

    pub fn single_channel(&self) -> &SingleChannelSource {
        &self.single_channel
    }

    /// Seed the single-channel watch set with the account's default
    /// channels, as done once after login.
    pub fn watch_default_channels(&self, account: &crate::account::Account) {
        for channel_id in &account.default_channels {
            self.single_channel.add(channel_id.clone());
        }
    }

    /// Single ingestion entry point for the transport. Validates the event,
    /// fans it out to the latest-value observables, stores it, and
    /// recomputes relay filters when it may have changed backfill state.
    pub fn on_event_received(&self, event: Event) -> Result<bool> {
        event.validate()?;
        self.observables.dispatch(&event);
        let new = self.cache.consume(event.clone())?;
        if new && Self::affects_channel_state(event.kind) {
            self.single_channel.invalidate();
        } else {
            trace!(id = %event.id, new, "event did not touch channel filters");
        }
        Ok(new)
    }

    fn affects_channel_state(kind: u32) -> bool {
        matches!(
            kind,
            kinds::CHANNEL_CREATE
                | kinds::CHANNEL_METADATA
                | kinds::CHANNEL_MESSAGE
                | kinds::LIVE_ACTIVITY
        )
    }
}
