pub mod channel;
pub mod chatroom;
pub mod event;
pub mod note;
pub mod user;

pub use channel::{Address, Channel, ChannelMetadata, LiveActivityChannel, PublicChatChannel, StreamInfo};
pub use chatroom::ChatroomKey;
pub use event::{Event, EventError, Tag};
pub use note::Note;
pub use user::User;
