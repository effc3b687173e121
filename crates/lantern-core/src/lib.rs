//! Local data core for a Nostr client.
//!
//! Owns the in-memory event cache ([`store::LocalCache`]), reactive
//! latest-value observables ([`observables`]), relay filter construction
//! driven by a watch set ([`relays`]), and the feed filters that derive
//! display-ordered entity lists ([`feed`]).
//!
//! The wire transport, signing, and any UI live outside this crate. The
//! transport feeds events in through [`client::ClientCore::on_event_received`]
//! and reads the declarative filters published by the data sources.

pub mod account;
pub mod client;
pub mod constants;
pub mod feed;
pub mod model;
pub mod observables;
pub mod relays;
pub mod store;

pub use account::Account;
pub use client::ClientCore;
pub use model::{ChatroomKey, Event, EventError, Tag};
pub use store::LocalCache;
