pub mod filter;
pub mod single_channel;

pub use filter::{FeedType, TypedFilter, WireFilter, COMMON_FEED_TYPES};
pub use single_channel::SingleChannelSource;
