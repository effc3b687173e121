//! Protocol-wide constants.
//!
//! Centralized location for event kind numbers used across multiple
//! modules.

/// Nostr event kinds handled by the cache.
pub mod kinds {
    /// User profile metadata (NIP-01)
    pub const METADATA: u32 = 0;
    /// Text note
    pub const TEXT_NOTE: u32 = 1;
    /// Contact list / follows (NIP-02)
    pub const CONTACT_LIST: u32 = 3;
    /// Encrypted direct message (NIP-04)
    pub const ENCRYPTED_DM: u32 = 4;
    /// Public chat channel creation (NIP-28)
    pub const CHANNEL_CREATE: u32 = 40;
    /// Public chat channel metadata update (NIP-28)
    pub const CHANNEL_METADATA: u32 = 41;
    /// Public chat channel message (NIP-28)
    pub const CHANNEL_MESSAGE: u32 = 42;
    /// Mute list (NIP-51)
    pub const MUTE_LIST: u32 = 10000;
    /// Live activity / stream (NIP-53, addressable)
    pub const LIVE_ACTIVITY: u32 = 30311;
}
