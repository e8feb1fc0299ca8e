pub mod comment;
pub mod pending_mutation;
pub mod post;
pub mod query_data;
pub mod upvote;
pub mod user;

pub use comment::{Comment, CommentParent, Upvoter};
pub use pending_mutation::{CacheSnapshot, MutationTarget, PendingMutation};
pub use post::Post;
pub use query_data::{InfiniteData, Page, Pagination, QueryData};
pub use upvote::UpvoteResult;
pub use user::{Author, SessionUser};
