//! Declarative relay query filters.
//!
//! The core only produces these structured objects; the transport turns
//! them into whatever REQ frames the protocol needs. Collections are
//! B-tree-backed so equal filter configurations compare and serialize
//! identically, which the idempotence guarantees lean on.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Relay categories a filter should be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeedType {
    Follows,
    PublicChats,
    PrivateDms,
    Global,
}

pub const COMMON_FEED_TYPES: [FeedType; 4] = [
    FeedType::Follows,
    FeedType::PublicChats,
    FeedType::PrivateDms,
    FeedType::Global,
];

/// A wire-level query: all present fields must match (logical AND).
///
/// A filter with no constraining field matches everything and must never be
/// emitted; builders return `None` instead (see [`WireFilter::is_constrained`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireFilter {
    pub ids: Option<BTreeSet<String>>,
    pub authors: Option<BTreeSet<String>>,
    pub kinds: Option<BTreeSet<u32>>,
    /// Tag-name to accepted-values constraints, serialized as `#e`, `#d`, ...
    pub tags: Option<BTreeMap<String, BTreeSet<String>>>,
    pub since: Option<u64>,
    pub limit: Option<u64>,
}

impl WireFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(self, kind: u32) -> Self {
        self.kinds([kind])
    }

    pub fn kinds<I: IntoIterator<Item = u32>>(mut self, kinds: I) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn tag<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when at least one field actually narrows the query. `since` and
    /// `limit` alone do not count: a filter carrying only those would still
    /// ask the relay for everything.
    pub fn is_constrained(&self) -> bool {
        let non_empty = |s: &Option<BTreeSet<String>>| s.as_ref().is_some_and(|v| !v.is_empty());
        non_empty(&self.ids)
            || non_empty(&self.authors)
            || self.kinds.as_ref().is_some_and(|k| !k.is_empty())
            || self
                .tags
                .as_ref()
                .is_some_and(|t| t.values().any(|v| !v.is_empty()))
    }
}

impl Serialize for WireFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(ids) = &self.ids {
            map.serialize_entry("ids", ids)?;
        }
        if let Some(authors) = &self.authors {
            map.serialize_entry("authors", authors)?;
        }
        if let Some(kinds) = &self.kinds {
            map.serialize_entry("kinds", kinds)?;
        }
        if let Some(tags) = &self.tags {
            for (name, values) in tags {
                map.serialize_entry(&format!("#{name}"), values)?;
            }
        }
        if let Some(since) = self.since {
            map.serialize_entry("since", &since)?;
        }
        if let Some(limit) = self.limit {
            map.serialize_entry("limit", &limit)?;
        }
        map.end()
    }
}

/// A wire filter together with the relay categories it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedFilter {
    pub types: BTreeSet<FeedType>,
    pub filter: WireFilter,
}

impl TypedFilter {
    pub fn new<I: IntoIterator<Item = FeedType>>(types: I, filter: WireFilter) -> Self {
        TypedFilter {
            types: types.into_iter().collect(),
            filter,
        }
    }
}
