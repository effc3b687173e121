use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Event;

/// Identity of a private chatroom: the sorted set of participant pubkeys.
/// The same participants always produce the same key regardless of who
/// authored a given message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatroomKey {
    users: BTreeSet<String>,
}

impl ChatroomKey {
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChatroomKey {
            users: participants.into_iter().map(Into::into).collect(),
        }
    }

    /// Key for a direct message: the author plus every `p`-tagged pubkey.
    /// `None` when the event references nobody (a DM without recipients).
    pub fn from_event(event: &Event) -> Option<ChatroomKey> {
        let mut users: BTreeSet<String> =
            event.tagged_users().map(str::to_string).collect();
        if users.is_empty() {
            return None;
        }
        users.insert(event.pubkey.clone());
        Some(ChatroomKey { users })
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    pub fn contains(&self, pubkey: &str) -> bool {
        self.users.contains(pubkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    #[test]
    fn key_is_order_independent() {
        let a = ChatroomKey::new(["k1", "k2"]);
        let b = ChatroomKey::new(["k2", "k1"]);
        assert_eq!(a, b);
    }

    #[test]
    fn from_event_includes_author_and_recipients() {
        let event = Event {
            id: "id".into(),
            pubkey: "author".into(),
            created_at: 1,
            kind: 4,
            tags: vec![Tag::new(["p", "friend"])],
            content: String::new(),
            sig: String::new(),
        };
        let key = ChatroomKey::from_event(&event).unwrap();
        assert_eq!(key, ChatroomKey::new(["author", "friend"]));

        let no_recipients = Event { tags: vec![], ..event };
        assert!(ChatroomKey::from_event(&no_recipients).is_none());
    }
}
