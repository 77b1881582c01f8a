pub mod mutations;
pub mod posts;

pub use mutations::{add_comment, create_post, increment_dislike, increment_like, Reaction};
pub use posts::{list_categories, list_posts, PostFilter};
