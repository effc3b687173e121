//! Public chat channel feed.

use std::collections::HashSet;

use crate::account::Account;
use crate::feed::{sort_chat_display, AdditiveFeedFilter, FeedFilter};
use crate::model::Note;
use crate::store::LocalCache;

pub struct ChannelFeedFilter {
    pub channel_id: String,
    pub account: Account,
}

impl ChannelFeedFilter {
    pub fn new(channel_id: impl Into<String>, account: Account) -> Self {
        ChannelFeedFilter {
            channel_id: channel_id.into(),
            account,
        }
    }
}

impl FeedFilter<Note> for ChannelFeedFilter {
    fn feed_key(&self) -> String {
        format!("{}-{}", self.account.pubkey, self.channel_id)
    }

    fn feed(&self, cache: &LocalCache) -> Vec<Note> {
        let accepted: HashSet<Note> = cache
            .channel_messages(&self.channel_id)
            .into_iter()
            .filter(|n| self.account.is_acceptable(n))
            .collect();
        self.sort(accepted)
    }
}

impl AdditiveFeedFilter<Note> for ChannelFeedFilter {
    fn apply_filter(&self, cache: &LocalCache, delta: &HashSet<Note>) -> HashSet<Note> {
        delta
            .iter()
            .filter(|n| {
                cache.channel_contains(&self.channel_id, &n.id)
                    && self.account.is_acceptable(n)
            })
            .cloned()
            .collect()
    }

    fn sort(&self, set: HashSet<Note>) -> Vec<Note> {
        sort_chat_display(set)
    }
}
