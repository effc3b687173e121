//! Per-user context consulted by feed filters.
//!
//! In-memory only; persisting these settings is the embedding
//! application's job. Serde derives keep the shape serializable for it.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::Note;

/// Channels every fresh account watches by default.
pub const DEFAULT_CHANNELS: [&str; 2] = [
    // Anigma's Nostr
    "25e5c82273a271cb1a840d0060391a0bf4965cafeb029d5ab55350b418953fbb",
    // Amethyst's Group
    "42224859763652914db53052103f0b744df79dfc4efef7e950fc0802fc3df3c5",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub pubkey: String,
    /// Pubkeys whose content is never shown.
    pub hidden_users: HashSet<String>,
    /// Lowercased words that hide a note when its content contains one.
    pub muted_words: HashSet<String>,
    pub default_channels: BTreeSet<String>,
}

impl Account {
    pub fn new(pubkey: impl Into<String>) -> Self {
        Account {
            pubkey: pubkey.into(),
            hidden_users: HashSet::new(),
            muted_words: HashSet::new(),
            default_channels: DEFAULT_CHANNELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn hide_user(&mut self, pubkey: impl Into<String>) {
        self.hidden_users.insert(pubkey.into());
    }

    pub fn mute_word(&mut self, word: &str) {
        self.muted_words.insert(word.to_lowercase());
    }

    pub fn is_hidden(&self, pubkey: &str) -> bool {
        self.hidden_users.contains(pubkey)
    }

    /// Acceptability predicate every feed applies: the note is loaded, its
    /// author is not hidden, and no muted word appears in its content.
    pub fn is_acceptable(&self, note: &Note) -> bool {
        let Some(event) = &note.event else {
            return false;
        };
        if self.is_hidden(&event.pubkey) {
            return false;
        }
        if !self.muted_words.is_empty() {
            let content = event.content.to_lowercase();
            if self.muted_words.iter().any(|w| content.contains(w)) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;

    fn note(pubkey: &str, content: &str) -> Note {
        Note::loaded(Event {
            id: "id".into(),
            pubkey: pubkey.into(),
            created_at: 1,
            kind: 1,
            tags: vec![],
            content: content.into(),
            sig: String::new(),
        })
    }

    #[test]
    fn hidden_authors_are_rejected() {
        let mut account = Account::new("me");
        account.hide_user("spammer");
        assert!(!account.is_acceptable(&note("spammer", "hi")));
        assert!(account.is_acceptable(&note("friend", "hi")));
    }

    #[test]
    fn muted_words_match_case_insensitively() {
        let mut account = Account::new("me");
        account.mute_word("Casino");
        assert!(!account.is_acceptable(&note("friend", "best CASINO in town")));
        assert!(account.is_acceptable(&note("friend", "hello")));
    }

    #[test]
    fn placeholder_notes_are_not_acceptable() {
        let account = Account::new("me");
        assert!(!account.is_acceptable(&Note::new("pending")));
    }
}
