pub mod view_index;

pub use view_index::ViewIndex;
