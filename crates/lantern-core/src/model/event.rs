//! Nostr event model.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Nostr tag stored verbatim as an array of strings.
///
/// The first element names the tag (`"e"`, `"p"`, `"d"`, ...) and the rest
/// hold its data. Uncommon or custom tags are preserved untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub Vec<String>);

impl Tag {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tag(parts.into_iter().map(Into::into).collect())
    }

    /// Tag name, i.e. the first element.
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// First data element after the name.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }
}

/// An immutable signed record in the protocol.
///
/// Identity is the `id` field. Signature *verification* is out of scope for
/// this crate; [`Event::validate`] only checks structural well-formedness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier (hex of a 32-byte hash).
    pub id: String,
    /// Author public key (32-byte hex).
    pub pubkey: String,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Kind number, e.g. `1` or `30311`.
    pub kind: u32,
    /// Ordered tag list.
    pub tags: Vec<Tag>,
    /// Content body.
    pub content: String,
    /// Schnorr signature over the event hash (64-byte hex).
    pub sig: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("event id is not 32 bytes of hex: {0:?}")]
    MalformedId(String),
    #[error("author key is not 32 bytes of hex: {0:?}")]
    MalformedPubkey(String),
    #[error("signature is not 64 bytes of hex")]
    MalformedSig,
}

/// True when `s` is exactly `bytes` bytes of lowercase-agnostic hex.
pub(crate) fn is_hex_of_len(s: &str, bytes: usize) -> bool {
    s.len() == bytes * 2 && hex::decode(s).map(|b| b.len() == bytes).unwrap_or(false)
}

impl Event {
    /// Structural validation of the hex-encoded fields.
    pub fn validate(&self) -> Result<(), EventError> {
        if !is_hex_of_len(&self.id, 32) {
            return Err(EventError::MalformedId(self.id.clone()));
        }
        if !is_hex_of_len(&self.pubkey, 32) {
            return Err(EventError::MalformedPubkey(self.pubkey.clone()));
        }
        if !is_hex_of_len(&self.sig, 64) {
            return Err(EventError::MalformedSig);
        }
        Ok(())
    }

    /// Any `e` tag referencing the given event id.
    pub fn is_tagged_event(&self, id: &str) -> bool {
        self.tags
            .iter()
            .any(|t| t.name() == Some("e") && t.value() == Some(id))
    }

    /// Any `p` tag referencing the given pubkey.
    pub fn is_tagged_user(&self, pubkey: &str) -> bool {
        self.tags
            .iter()
            .any(|t| t.name() == Some("p") && t.value() == Some(pubkey))
    }

    /// Value of the first tag with the given name.
    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name() == Some(name))
            .and_then(Tag::value)
    }

    /// The `d` tag identifying addressable events.
    pub fn d_tag(&self) -> Option<&str> {
        self.first_tag_value("d")
    }

    /// All event ids referenced through `e` tags, in tag order.
    pub fn tagged_events(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(|t| t.name() == Some("e"))
            .filter_map(Tag::value)
    }

    /// All pubkeys referenced through `p` tags, in tag order.
    pub fn tagged_users(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(|t| t.name() == Some("p"))
            .filter_map(Tag::value)
    }

    /// Total order used everywhere a "latest" event is selected: greater
    /// `created_at` wins, equal timestamps fall back to the lexicographically
    /// larger id. Both the bulk scan and the incremental update path use
    /// this, so replaying events in any order converges on the same value.
    pub fn cmp_created(&self, other: &Event) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    pub fn is_newer_than(&self, other: &Event) -> bool {
        self.cmp_created(other) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_id(n: u8) -> String {
        hex::encode([n; 32])
    }

    fn event(id: &str, created_at: u64) -> Event {
        Event {
            id: id.to_string(),
            pubkey: hex_id(9),
            created_at,
            kind: 1,
            tags: vec![],
            content: String::new(),
            sig: hex::encode([7u8; 64]),
        }
    }

    #[test]
    fn validate_accepts_well_formed_event() {
        assert_eq!(event(&hex_id(1), 10).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_malformed_fields() {
        let mut e = event("zz", 10);
        assert!(matches!(e.validate(), Err(EventError::MalformedId(_))));

        e = event(&hex_id(1), 10);
        e.pubkey = "00".into();
        assert!(matches!(e.validate(), Err(EventError::MalformedPubkey(_))));

        e = event(&hex_id(1), 10);
        e.sig = "not hex".into();
        assert_eq!(e.validate(), Err(EventError::MalformedSig));
    }

    #[test]
    fn newer_than_orders_by_created_at_then_id() {
        let older = event(&hex_id(1), 10);
        let newer = event(&hex_id(2), 20);
        assert!(newer.is_newer_than(&older));
        assert!(!older.is_newer_than(&newer));

        // Equal timestamps: lexicographically larger id wins.
        let a = event(&hex_id(1), 10);
        let b = event(&hex_id(2), 10);
        assert!(b.is_newer_than(&a));
        assert!(!a.is_newer_than(&b));
        assert!(!a.is_newer_than(&a));
    }

    #[test]
    fn tag_queries() {
        let mut e = event(&hex_id(1), 10);
        e.tags = vec![
            Tag::new(["e", "target"]),
            Tag::new(["p", "friend"]),
            Tag::new(["d", "slug"]),
        ];
        assert!(e.is_tagged_event("target"));
        assert!(!e.is_tagged_event("other"));
        assert!(e.is_tagged_user("friend"));
        assert_eq!(e.d_tag(), Some("slug"));
        assert_eq!(e.tagged_events().collect::<Vec<_>>(), vec!["target"]);
    }
}
