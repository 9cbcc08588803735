pub mod digest;
pub mod ranking;
pub mod recency;
pub mod records;
pub mod time_serde;

pub use ranking::Ranked;
pub use records::{ConversationRecord, EntityCategory, EntityRecord, Timestamped};
