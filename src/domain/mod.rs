pub mod entities;
pub mod value_objects;

pub use entities::{Comment, Post, QueryData};
pub use value_objects::{CommentId, PostId, QueryFilter, QueryKey};
