pub mod mutation_service;
pub mod optimistic_projector;
pub mod query_refresher;
pub mod reconciler;

pub use mutation_service::{
    CreateCommentArgs, CreateCommentMutation, MutationHandle, MutationResponse, MutationStatus,
    OptimisticMutation, UpvoteCommentMutation, UpvotePostMutation,
};
pub use optimistic_projector::OptimisticProjector;
pub use query_refresher::QueryRefresher;
pub use reconciler::Reconciler;
