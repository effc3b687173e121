//! In-memory event cache - single source of truth for cached protocol data.
//!
//! Populated by the transport through `consume`, read by feed filters and
//! observables. All maps sit behind `parking_lot` locks so concurrent
//! writers (incoming events) and readers (feed evaluation) never observe a
//! half-applied record.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::constants::kinds;
use crate::model::{Channel, ChannelMetadata, ChatroomKey, Event, Note, StreamInfo, User};

#[derive(Default)]
pub struct LocalCache {
    notes: RwLock<HashMap<String, Note>>,
    users: RwLock<HashMap<String, User>>,
    channels: RwLock<HashMap<String, Channel>>,
    chatrooms: RwLock<HashMap<ChatroomKey, HashSet<String>>>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    // --- notes ---

    pub fn note(&self, id: &str) -> Option<Note> {
        self.notes.read().get(id).cloned()
    }

    /// Get or create a placeholder note for an id learned from a tag.
    /// Idempotent and cheap; never overwrites a loaded note.
    pub fn get_or_create_note(&self, id: &str) -> Note {
        let mut notes = self.notes.write();
        notes
            .entry(id.to_string())
            .or_insert_with(|| Note::new(id))
            .clone()
    }

    /// Scan every cached note, returning those the predicate accepts.
    pub fn scan<F>(&self, predicate: F) -> Vec<Note>
    where
        F: Fn(&Note) -> bool,
    {
        self.notes
            .read()
            .values()
            .filter(|n| predicate(n))
            .cloned()
            .collect()
    }

    // --- users ---

    pub fn user(&self, pubkey: &str) -> Option<User> {
        self.users.read().get(pubkey).cloned()
    }

    pub fn get_or_create_user(&self, pubkey: &str) -> User {
        let mut users = self.users.write();
        users
            .entry(pubkey.to_string())
            .or_insert_with(|| User::new(pubkey))
            .clone()
    }

    // --- channels ---

    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.channels.read().get(id).cloned()
    }

    /// Get or create the channel for an id, validating the id shape first.
    /// Returns `None` for ids that are neither a 32-byte hex event id nor an
    /// address. Creation as a side effect of the check is intentional:
    /// answering "is it loaded" requires the entity to exist.
    pub fn check_get_or_create_channel(&self, id: &str) -> Option<Channel> {
        self.with_channel(id, |c| c.clone())
    }

    /// Notes attached to a channel, resolved to cached notes.
    pub fn channel_messages(&self, id: &str) -> Vec<Note> {
        let ids: Vec<String> = match self.channels.read().get(id) {
            Some(channel) => channel.notes().iter().cloned().collect(),
            None => return Vec::new(),
        };
        let notes = self.notes.read();
        ids.iter().filter_map(|id| notes.get(id).cloned()).collect()
    }

    pub fn channel_contains(&self, id: &str, note_id: &str) -> bool {
        self.channels
            .read()
            .get(id)
            .is_some_and(|c| c.notes().contains(note_id))
    }

    fn with_channel<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Channel) -> R,
    {
        let mut channels = self.channels.write();
        if let Some(channel) = channels.get_mut(id) {
            return Some(f(channel));
        }
        let created = Channel::for_id(id)?;
        Some(f(channels.entry(id.to_string()).or_insert(created)))
    }

    // --- chatrooms ---

    /// Messages of a private chatroom, resolved to cached notes.
    pub fn chatroom_messages(&self, key: &ChatroomKey) -> Vec<Note> {
        let ids: Vec<String> = match self.chatrooms.read().get(key) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return Vec::new(),
        };
        let notes = self.notes.read();
        ids.iter().filter_map(|id| notes.get(id).cloned()).collect()
    }

    pub fn chatroom_contains(&self, key: &ChatroomKey, note_id: &str) -> bool {
        self.chatrooms
            .read()
            .get(key)
            .is_some_and(|ids| ids.contains(note_id))
    }

    // --- ingestion ---

    /// Ingest one event, dispatching on its kind. Returns `Ok(false)` for an
    /// already-loaded duplicate, `Ok(true)` when the event was new.
    pub fn consume(&self, event: Event) -> Result<bool> {
        // Record the note first so kind handlers (and concurrent readers
        // resolving channel note ids) always find it. The duplicate check
        // happens under the same write lock, so exactly one of any set of
        // concurrent deliveries of an id reports `Ok(true)`.
        {
            let mut notes = self.notes.write();
            let note = notes
                .entry(event.id.clone())
                .or_insert_with(|| Note::new(event.id.clone()));
            if note.is_loaded() {
                trace!(id = %event.id, "duplicate event ignored");
                return Ok(false);
            }
            note.event = Some(event.clone());
        }

        match event.kind {
            kinds::METADATA => self.consume_user_metadata(&event),
            kinds::CONTACT_LIST => self.consume_contact_list(&event),
            kinds::MUTE_LIST => self.consume_mute_list(&event),
            kinds::CHANNEL_CREATE => self.consume_channel_create(&event),
            kinds::CHANNEL_METADATA => self.consume_channel_metadata(&event),
            kinds::CHANNEL_MESSAGE => self.consume_channel_message(&event),
            kinds::ENCRYPTED_DM => self.consume_direct_message(&event),
            kinds::LIVE_ACTIVITY => self.consume_live_activity(&event),
            _ => {}
        }

        debug!(id = %event.id, kind = event.kind, "event ingested");
        Ok(true)
    }

    /// Replaceable rule (kinds 0, 3, ...): only a strictly newer event
    /// replaces the cached one.
    fn consume_user_metadata(&self, event: &Event) {
        let mut users = self.users.write();
        let user = match users.entry(event.pubkey.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(User::new(&event.pubkey)),
        };
        let newer = user
            .latest_metadata
            .as_ref()
            .is_none_or(|cur| event.is_newer_than(cur));
        if newer {
            user.latest_metadata = Some(event.clone());
        }
    }

    fn consume_contact_list(&self, event: &Event) {
        let mut users = self.users.write();
        let user = match users.entry(event.pubkey.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(User::new(&event.pubkey)),
        };
        let newer = user
            .latest_contact_list
            .as_ref()
            .is_none_or(|cur| event.is_newer_than(cur));
        if newer {
            user.latest_contact_list = Some(event.clone());
        }
    }

    fn consume_mute_list(&self, event: &Event) {
        let mut users = self.users.write();
        let user = match users.entry(event.pubkey.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(User::new(&event.pubkey)),
        };
        let newer = user
            .latest_mute_list
            .as_ref()
            .is_none_or(|cur| event.is_newer_than(cur));
        if newer {
            user.latest_mute_list = Some(event.clone());
        }
    }

    fn consume_channel_create(&self, event: &Event) {
        let metadata: Option<ChannelMetadata> = serde_json::from_str(&event.content).ok();
        self.with_channel(&event.id, |channel| {
            if let Channel::PublicChat(chat) = channel {
                let newer = chat.metadata_at.is_none_or(|at| event.created_at > at);
                if newer && metadata.is_some() {
                    chat.metadata = metadata;
                    chat.metadata_at = Some(event.created_at);
                }
                // The creation event counts as channel content; backfill
                // stops requesting it once this is present.
                chat.notes.insert(event.id.clone());
            }
        });
    }

    fn consume_channel_metadata(&self, event: &Event) {
        let Some(channel_id) = event.first_tag_value("e").map(str::to_string) else {
            warn!(id = %event.id, "channel metadata without e tag");
            return;
        };
        let metadata: Option<ChannelMetadata> = serde_json::from_str(&event.content).ok();
        self.with_channel(&channel_id, |channel| {
            if let Channel::PublicChat(chat) = channel {
                let newer = chat.metadata_at.is_none_or(|at| event.created_at > at);
                if newer && metadata.is_some() {
                    chat.metadata = metadata;
                    chat.metadata_at = Some(event.created_at);
                }
            }
        });
    }

    fn consume_channel_message(&self, event: &Event) {
        let Some(channel_id) = event.first_tag_value("e").map(str::to_string) else {
            warn!(id = %event.id, "channel message without e tag");
            return;
        };
        self.with_channel(&channel_id, |channel| {
            channel.notes_mut().insert(event.id.clone());
        });
    }

    fn consume_direct_message(&self, event: &Event) {
        let Some(key) = ChatroomKey::from_event(event) else {
            warn!(id = %event.id, "direct message without recipients");
            return;
        };
        self.chatrooms
            .write()
            .entry(key)
            .or_default()
            .insert(event.id.clone());
    }

    fn consume_live_activity(&self, event: &Event) {
        let Some(d_tag) = event.d_tag() else {
            warn!(id = %event.id, "live activity without d tag");
            return;
        };
        let address =
            crate::model::Address::new(event.kind, event.pubkey.clone(), d_tag);
        let info = StreamInfo::from_event(event);
        self.with_channel(&address.to_tag_value(), |channel| {
            if let Channel::LiveActivity(live) = channel {
                let newer = live.info_at.is_none_or(|at| event.created_at > at);
                if newer {
                    live.info = Some(info);
                    live.info_at = Some(event.created_at);
                }
                live.notes.insert(event.id.clone());
            }
        });
    }
}
