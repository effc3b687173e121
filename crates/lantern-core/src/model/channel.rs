//! Chat channel entities.
//!
//! Two closed variants instead of the open subtype hierarchy the protocol
//! suggests: public chats (NIP-28, identified by the creation event id) and
//! live activities (NIP-53, identified by their address). Code that only
//! applies to one variant goes through the `as_*` capability queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::event::is_hex_of_len;
use crate::model::Event;

/// Address of an addressable (parameterized-replaceable) event:
/// `kind:pubkey:d_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub kind: u32,
    pub pubkey: String,
    pub d_tag: String,
}

impl Address {
    pub fn new(kind: u32, pubkey: impl Into<String>, d_tag: impl Into<String>) -> Self {
        Address {
            kind,
            pubkey: pubkey.into(),
            d_tag: d_tag.into(),
        }
    }

    /// Parse the `kind:pubkey:d_tag` form used in `a` tags and as live
    /// activity channel ids.
    pub fn parse(s: &str) -> Option<Address> {
        let mut parts = s.splitn(3, ':');
        let kind = parts.next()?.parse().ok()?;
        let pubkey = parts.next()?;
        let d_tag = parts.next()?;
        if !is_hex_of_len(pubkey, 32) {
            return None;
        }
        Some(Address::new(kind, pubkey, d_tag))
    }

    pub fn to_tag_value(&self) -> String {
        format!("{}:{}:{}", self.kind, self.pubkey, self.d_tag)
    }
}

/// Channel metadata carried by NIP-28 kind 40/41 content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub name: Option<String>,
    pub about: Option<String>,
    pub picture: Option<String>,
}

/// Stream information carried by a NIP-53 live activity event's tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub streaming: Option<String>,
    pub status: Option<String>,
    pub starts: Option<u64>,
}

impl StreamInfo {
    pub fn from_event(event: &Event) -> StreamInfo {
        StreamInfo {
            title: event.first_tag_value("title").map(str::to_string),
            summary: event.first_tag_value("summary").map(str::to_string),
            streaming: event.first_tag_value("streaming").map(str::to_string),
            status: event.first_tag_value("status").map(str::to_string),
            starts: event
                .first_tag_value("starts")
                .and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicChatChannel {
    /// Creation event id (hex).
    pub id: String,
    pub metadata: Option<ChannelMetadata>,
    /// Timestamp of the event that last set `metadata`.
    pub metadata_at: Option<u64>,
    /// Ids of events attached to this channel (creation + messages).
    pub notes: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct LiveActivityChannel {
    /// Address in `kind:pubkey:d_tag` form; doubles as the channel id.
    pub address: Address,
    pub info: Option<StreamInfo>,
    /// Timestamp of the event that last set `info`.
    pub info_at: Option<u64>,
    pub notes: HashSet<String>,
}

impl LiveActivityChannel {
    pub fn id(&self) -> String {
        self.address.to_tag_value()
    }
}

#[derive(Debug, Clone)]
pub enum Channel {
    PublicChat(PublicChatChannel),
    LiveActivity(LiveActivityChannel),
}

impl Channel {
    /// Construct the right variant for a channel id: an address form yields
    /// a live activity, a 32-byte hex id a public chat. Anything else is not
    /// a channel id.
    pub fn for_id(id: &str) -> Option<Channel> {
        if let Some(address) = Address::parse(id) {
            return Some(Channel::LiveActivity(LiveActivityChannel {
                address,
                info: None,
                info_at: None,
                notes: HashSet::new(),
            }));
        }
        if is_hex_of_len(id, 32) {
            return Some(Channel::PublicChat(PublicChatChannel {
                id: id.to_string(),
                metadata: None,
                metadata_at: None,
                notes: HashSet::new(),
            }));
        }
        None
    }

    pub fn id(&self) -> String {
        match self {
            Channel::PublicChat(c) => c.id.clone(),
            Channel::LiveActivity(c) => c.id(),
        }
    }

    pub fn notes(&self) -> &HashSet<String> {
        match self {
            Channel::PublicChat(c) => &c.notes,
            Channel::LiveActivity(c) => &c.notes,
        }
    }

    pub fn notes_mut(&mut self) -> &mut HashSet<String> {
        match self {
            Channel::PublicChat(c) => &mut c.notes,
            Channel::LiveActivity(c) => &mut c.notes,
        }
    }

    pub fn as_public_chat(&self) -> Option<&PublicChatChannel> {
        match self {
            Channel::PublicChat(c) => Some(c),
            Channel::LiveActivity(_) => None,
        }
    }

    pub fn as_live_activity(&self) -> Option<&LiveActivityChannel> {
        match self {
            Channel::LiveActivity(c) => Some(c),
            Channel::PublicChat(_) => None,
        }
    }
}
