pub mod cache;
pub mod http;
pub mod notifier;

pub use cache::ViewIndex;
pub use http::HttpBoardApi;
pub use notifier::{ChannelNotifier, TracingNotifier};
