//! Private chatroom feed: the messages between one set of participants.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::account::Account;
use crate::feed::{sort_chat_display, AdditiveFeedFilter, FeedFilter};
use crate::model::{ChatroomKey, Note};
use crate::store::LocalCache;

pub struct ChatroomFeedFilter {
    pub with_user: ChatroomKey,
    pub account: Account,
}

impl ChatroomFeedFilter {
    pub fn new(with_user: ChatroomKey, account: Account) -> Self {
        ChatroomFeedFilter { with_user, account }
    }
}

impl FeedFilter<Note> for ChatroomFeedFilter {
    /// Digest of the sorted participant set; equal rooms yield equal keys
    /// and distinct rooms collide only with negligible probability.
    fn feed_key(&self) -> String {
        let mut hasher = Sha256::new();
        for user in self.with_user.users() {
            hasher.update(user.as_bytes());
            hasher.update(b"-");
        }
        hex::encode(hasher.finalize())
    }

    fn feed(&self, cache: &LocalCache) -> Vec<Note> {
        let accepted: HashSet<Note> = cache
            .chatroom_messages(&self.with_user)
            .into_iter()
            .filter(|n| self.account.is_acceptable(n))
            .collect();
        self.sort(accepted)
    }
}

impl AdditiveFeedFilter<Note> for ChatroomFeedFilter {
    fn apply_filter(&self, cache: &LocalCache, delta: &HashSet<Note>) -> HashSet<Note> {
        delta
            .iter()
            .filter(|n| {
                cache.chatroom_contains(&self.with_user, &n.id)
                    && self.account.is_acceptable(n)
            })
            .cloned()
            .collect()
    }

    fn sort(&self, set: HashSet<Note>) -> Vec<Note> {
        sort_chat_display(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::kinds;
    use crate::model::{Event, Tag};

    fn hex_id(n: u8) -> String {
        hex::encode([n; 32])
    }

    fn dm(id_byte: u8, from: &str, to: &str, created_at: u64, content: &str) -> Event {
        Event {
            id: hex_id(id_byte),
            pubkey: from.into(),
            created_at,
            kind: kinds::ENCRYPTED_DM,
            tags: vec![Tag::new(["p", to])],
            content: content.into(),
            sig: hex::encode([7u8; 64]),
        }
    }

    fn setup() -> (LocalCache, ChatroomKey, Account) {
        let cache = LocalCache::new();
        let me = hex_id(0xA1);
        let friend = hex_id(0xB2);
        cache.consume(dm(1, &me, &friend, 3, "first")).unwrap();
        cache.consume(dm(2, &friend, &me, 1, "second")).unwrap();
        cache.consume(dm(3, &me, &friend, 2, "third")).unwrap();
        let key = ChatroomKey::new([me.clone(), friend]);
        (cache, key, Account::new(me))
    }

    #[test]
    fn feed_is_newest_first() {
        let (cache, key, account) = setup();
        let feed = ChatroomFeedFilter::new(key, account).feed(&cache);
        let order: Vec<u64> = feed.iter().filter_map(Note::created_at).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn hidden_authors_are_filtered_out() {
        let (cache, key, mut account) = setup();
        let hidden = hex_id(0xB2);
        account.hide_user(hidden.clone());
        let feed = ChatroomFeedFilter::new(key, account).feed(&cache);
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|n| n.author() != Some(hidden.as_str())));
    }

    #[test]
    fn additive_and_full_membership_agree() {
        let (cache, key, mut account) = setup();
        account.mute_word("third");
        let filter = ChatroomFeedFilter::new(key, account);

        let full: HashSet<Note> = filter.feed(&cache).into_iter().collect();

        // Every cached note, plus one alien note that is in no chatroom.
        let mut candidates: HashSet<Note> =
            cache.scan(|_| true).into_iter().collect();
        candidates.insert(Note::loaded(dm(9, &hex_id(0xC3), &hex_id(0xC4), 9, "elsewhere")));

        let additive = filter.apply_filter(&cache, &candidates);
        for note in &candidates {
            assert_eq!(
                additive.contains(note),
                full.contains(note),
                "membership diverged for {}",
                note.id
            );
        }
    }

    #[test]
    fn feed_key_is_stable_and_order_independent() {
        let account = Account::new(hex_id(0xA1));
        let a = ChatroomFeedFilter::new(
            ChatroomKey::new([hex_id(0xA1), hex_id(0xB2)]),
            account.clone(),
        );
        let b = ChatroomFeedFilter::new(
            ChatroomKey::new([hex_id(0xB2), hex_id(0xA1)]),
            account.clone(),
        );
        let other = ChatroomFeedFilter::new(
            ChatroomKey::new([hex_id(0xA1), hex_id(0xC3)]),
            account,
        );
        assert_eq!(a.feed_key(), b.feed_key());
        assert_ne!(a.feed_key(), other.feed_key());
    }
}
