pub mod board_api;
pub mod cache;
pub mod notifier;

pub use board_api::{BoardApi, CommentSubmission};
pub use cache::{
    FetchStatus, FetchTicket, InvalidateOptions, QueryCache, RefetchPolicy, SlotActivity,
    SlotStatus, SlotUpdater,
};
pub use notifier::{Notice, NoticeLevel, Notifier};
