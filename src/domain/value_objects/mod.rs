pub mod ids;
pub mod mutation_kind;
pub mod query_filter;
pub mod query_key;

pub use ids::{CommentId, PLACEHOLDER_ID, PostId, UserId};
pub use mutation_kind::MutationKind;
pub use query_filter::QueryFilter;
pub use query_key::{CommentScope, PostsFilter, QueryKey, QueryKind, SortBy, SortOrder};
