//! Follows of a viewed profile, per its latest contact list.

use parking_lot::Mutex;

use crate::account::Account;
use crate::feed::FeedFilter;
use crate::model::User;
use crate::store::LocalCache;

pub struct UserProfileFollowsFeedFilter {
    /// Pubkey of the profile being viewed.
    pub user: String,
    pub account: Account,
    /// Memoized result keyed by the contact-list event id it was derived
    /// from; a newer contact list invalidates it.
    cache: Mutex<Option<(String, Vec<User>)>>,
}

impl UserProfileFollowsFeedFilter {
    pub fn new(user: impl Into<String>, account: Account) -> Self {
        UserProfileFollowsFeedFilter {
            user: user.into(),
            account,
            cache: Mutex::new(None),
        }
    }
}

impl FeedFilter<User> for UserProfileFollowsFeedFilter {
    fn feed_key(&self) -> String {
        format!("{}-{}", self.account.pubkey, self.user)
    }

    fn feed(&self, store: &LocalCache) -> Vec<User> {
        let Some(profile) = store.user(&self.user) else {
            return Vec::new();
        };
        let Some(contact_list) = profile.latest_contact_list.clone() else {
            return Vec::new();
        };

        {
            let memo = self.cache.lock();
            if let Some((event_id, users)) = memo.as_ref() {
                if *event_id == contact_list.id {
                    return users.clone();
                }
            }
        }

        // Dedup while keeping list order, then newest-added first.
        let mut seen = std::collections::HashSet::new();
        let mut users: Vec<User> = profile
            .follow_keys()
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .map(|key| store.get_or_create_user(&key))
            .filter(|user| !self.account.is_hidden(&user.pubkey))
            .collect();
        users.reverse();

        *self.cache.lock() = Some((contact_list.id, users.clone()));
        users
    }
}
