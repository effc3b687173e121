use serde::Deserialize;

use crate::model::Event;

/// A cached user: pubkey plus the latest replaceable events seen for it.
#[derive(Debug, Clone, Default)]
pub struct User {
    pub pubkey: String,
    /// Latest kind:0 profile metadata event.
    pub latest_metadata: Option<Event>,
    /// Latest kind:3 contact list event.
    pub latest_contact_list: Option<Event>,
    /// Latest kind:10000 mute list event.
    pub latest_mute_list: Option<Event>,
}

/// The subset of kind:0 content this core cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileMetadata {
    pub name: Option<String>,
    pub about: Option<String>,
    pub picture: Option<String>,
}

impl User {
    pub fn new(pubkey: impl Into<String>) -> Self {
        User {
            pubkey: pubkey.into(),
            ..Default::default()
        }
    }

    /// Parsed profile metadata, if a kind:0 has been seen.
    pub fn profile(&self) -> Option<ProfileMetadata> {
        let event = self.latest_metadata.as_ref()?;
        serde_json::from_str(&event.content).ok()
    }

    /// Display name from profile metadata, falling back to the pubkey.
    pub fn display_name(&self) -> String {
        self.profile()
            .and_then(|p| p.name)
            .unwrap_or_else(|| self.pubkey.clone())
    }

    /// Followed pubkeys per the latest contact list, in tag order.
    /// Unverified: signature checking is outside this crate.
    pub fn follow_keys(&self) -> Vec<String> {
        self.latest_contact_list
            .as_ref()
            .map(|e| e.tagged_users().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Muted pubkeys per the latest mute list, in tag order. The public
    /// half only; encrypted mute entries need a signer and stay opaque
    /// here.
    pub fn muted_keys(&self) -> Vec<String> {
        self.latest_mute_list
            .as_ref()
            .map(|e| e.tagged_users().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    #[test]
    fn follow_keys_come_from_contact_list_p_tags() {
        let mut user = User::new("abc");
        assert!(user.follow_keys().is_empty());

        user.latest_contact_list = Some(Event {
            id: "00".into(),
            pubkey: "abc".into(),
            created_at: 1,
            kind: crate::constants::kinds::CONTACT_LIST,
            tags: vec![Tag::new(["p", "k1"]), Tag::new(["p", "k2"]), Tag::new(["e", "x"])],
            content: String::new(),
            sig: String::new(),
        });
        assert_eq!(user.follow_keys(), vec!["k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn muted_keys_come_from_mute_list_p_tags() {
        let mut user = User::new("abc");
        assert!(user.muted_keys().is_empty());

        user.latest_mute_list = Some(Event {
            id: "00".into(),
            pubkey: "abc".into(),
            created_at: 1,
            kind: crate::constants::kinds::MUTE_LIST,
            tags: vec![Tag::new(["p", "spammer"]), Tag::new(["t", "topic"])],
            content: String::new(),
            sig: String::new(),
        });
        assert_eq!(user.muted_keys(), vec!["spammer".to_string()]);
    }

    #[test]
    fn display_name_prefers_profile_name() {
        let mut user = User::new("abc");
        assert_eq!(user.display_name(), "abc");

        user.latest_metadata = Some(Event {
            id: "00".into(),
            pubkey: "abc".into(),
            created_at: 1,
            kind: crate::constants::kinds::METADATA,
            tags: vec![],
            content: r#"{"name":"alice","about":"hi"}"#.into(),
            sig: String::new(),
        });
        assert_eq!(user.display_name(), "alice");
    }
}
